//! Tracked query-string parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::wire_date;
use crate::errors::ValidationError;
use crate::validation::validate_query_parameter_token;

/// A query-parameter name in the shape the service accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueryParamToken(String);

impl QueryParamToken {
    /// Validates and wraps a token.
    pub fn parse(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        validate_query_parameter_token(&token)?;
        Ok(Self(token))
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for QueryParamToken {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<QueryParamToken> for String {
    fn from(token: QueryParamToken) -> Self {
        token.0
    }
}

impl AsRef<str> for QueryParamToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryParamToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A query parameter tracked for URL normalization on a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryParameter {
    /// Service-side type tag.
    #[serde(rename = "__type", default)]
    pub kind: String,
    /// Last modification time.
    #[serde(deserialize_with = "wire_date::deserialize")]
    pub date: DateTime<Utc>,
    /// Whether the parameter is currently honored.
    pub is_enabled: bool,
    /// The parameter name.
    pub parameter: QueryParamToken,
    /// Where the parameter came from.
    #[serde(default)]
    pub source: i32,
}

impl QueryParameter {
    /// Human label for the enabled flag.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        if self.is_enabled {
            "enabled"
        } else {
            "disabled"
        }
    }
}

//! Query-parameter management for URL normalization.

use std::sync::Arc;

use crate::errors::Result;
use crate::models::{QueryParamToken, QueryParameter};
use crate::protocols::QueryParameterStore;
use crate::validation::validate_url_field;

/// Operations on the query parameters a site tracks.
#[derive(Clone)]
pub struct UrlManagementService {
    store: Arc<dyn QueryParameterStore>,
}

impl UrlManagementService {
    /// Creates a service over a parameter store.
    #[must_use]
    pub fn new(store: Arc<dyn QueryParameterStore>) -> Self {
        Self { store }
    }

    /// Lists the query parameters tracked for a site.
    pub async fn get_query_parameters(&self, site_url: &str) -> Result<Vec<QueryParameter>> {
        validate_url_field("site_url", site_url)?;
        Ok(self.store.fetch_query_parameters(site_url).await?)
    }

    /// Starts tracking `parameter`.
    pub async fn add_query_parameter(&self, site_url: &str, parameter: &str) -> Result<()> {
        let token = Self::checked(site_url, parameter)?;
        self.store.add_query_parameter(site_url, &token).await?;
        tracing::debug!(site_url, parameter = %token, "Query parameter added");
        Ok(())
    }

    /// Stops tracking `parameter`.
    pub async fn remove_query_parameter(&self, site_url: &str, parameter: &str) -> Result<()> {
        let token = Self::checked(site_url, parameter)?;
        self.store.remove_query_parameter(site_url, &token).await?;
        tracing::debug!(site_url, parameter = %token, "Query parameter removed");
        Ok(())
    }

    /// Enables or disables a tracked parameter.
    pub async fn enable_disable_query_parameter(
        &self,
        site_url: &str,
        parameter: &str,
        enabled: bool,
    ) -> Result<()> {
        let token = Self::checked(site_url, parameter)?;
        self.store
            .set_query_parameter_enabled(site_url, &token, enabled)
            .await?;
        tracing::debug!(site_url, parameter = %token, enabled, "Query parameter toggled");
        Ok(())
    }

    fn checked(site_url: &str, parameter: &str) -> Result<QueryParamToken> {
        validate_url_field("site_url", site_url)?;
        Ok(QueryParamToken::parse(parameter)?)
    }
}

impl std::fmt::Debug for UrlManagementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlManagementService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ValidationErrorKind, WebmasterError};
    use crate::protocols::MockQueryParameterStore;
    use crate::testing::InMemoryBackend;
    use pretty_assertions::assert_eq;

    const SITE: &str = "http://site.com";

    #[tokio::test]
    async fn test_invalid_parameters_never_reach_store() {
        let mut mock = MockQueryParameterStore::new();
        mock.expect_add_query_parameter().never();
        mock.expect_remove_query_parameter().never();
        mock.expect_set_query_parameter_enabled().never();
        let service = UrlManagementService::new(Arc::new(mock));

        for bad in ["invalid@param", "", " ", "abc 123"] {
            let err = service.add_query_parameter(SITE, bad).await.unwrap_err();
            assert!(
                matches!(err, WebmasterError::Validation(ref e) if e.kind == ValidationErrorKind::InvalidFormat),
                "{bad:?} -> {err:?}"
            );
        }
        assert!(service.remove_query_parameter(SITE, "a b").await.is_err());
        assert!(service
            .enable_disable_query_parameter(SITE, "a/b", true)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_store_receives_validated_token() {
        let mut mock = MockQueryParameterStore::new();
        mock.expect_add_query_parameter()
            .withf(|site, token| site == SITE && token.as_str() == "param:with:colons")
            .times(1)
            .returning(|_, _| Ok(()));
        let service = UrlManagementService::new(Arc::new(mock));

        service
            .add_query_parameter(SITE, "param:with:colons")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_query_parameter_lifecycle() {
        let service = UrlManagementService::new(Arc::new(InMemoryBackend::new()));

        assert!(service.get_query_parameters(SITE).await.unwrap().is_empty());

        service.add_query_parameter(SITE, "sort").await.unwrap();
        let params = service.get_query_parameters(SITE).await.unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].parameter.as_str(), "sort");
        assert!(params[0].is_enabled);

        service
            .enable_disable_query_parameter(SITE, "sort", false)
            .await
            .unwrap();
        let params = service.get_query_parameters(SITE).await.unwrap();
        assert!(!params[0].is_enabled);

        service
            .enable_disable_query_parameter(SITE, "sort", true)
            .await
            .unwrap();
        assert!(service.get_query_parameters(SITE).await.unwrap()[0].is_enabled);

        service.remove_query_parameter(SITE, "sort").await.unwrap();
        assert!(service.get_query_parameters(SITE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_parameter_is_remote_error() {
        let service = UrlManagementService::new(Arc::new(InMemoryBackend::new()));
        let err = service.remove_query_parameter(SITE, "missing").await.unwrap_err();
        assert!(matches!(err, WebmasterError::Remote(_)));
    }
}

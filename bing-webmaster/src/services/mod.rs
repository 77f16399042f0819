//! Public operations over a site.

mod links;
mod urls;

pub use links::LinkAnalysisService;
pub use urls::UrlManagementService;

//! Boundary handler in front of the external scraping service.
//!
//! Composes admission, bucketing, and caller-injected storage
//! capabilities; holds no business state of its own. Identity and plan
//! tier arrive already authenticated from upstream.

pub mod handler;
pub mod scraper;
pub mod store;

pub use handler::{FetchOutcome, FetchRequest, Gateway};
pub use scraper::{HttpScraperClient, ScrapeJob, ScrapeResult, ScraperClient};
pub use store::{ActionLogStore, AssignmentStore};

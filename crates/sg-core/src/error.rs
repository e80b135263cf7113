#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Plan policy file invalid at '{path}': {message}")]
    InvalidPolicyFile { path: String, message: String },

    #[error("Scraper service returned HTTP {status}")]
    ScraperStatus { status: u16 },

    #[error("Scraper service unreachable: {0}")]
    ScraperUnreachable(String),
}

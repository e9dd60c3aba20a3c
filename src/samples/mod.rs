pub mod error;
pub mod hourly_fetcher;

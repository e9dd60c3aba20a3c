use thiserror::Error;

/// Why one hourly snapshot could not be used. These never abort a run; they
/// end up as [`crate::HourFetchError`] entries in the data-quality report.
#[derive(Debug, Error)]
pub enum SampleFetchError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Request for {0} timed out")]
    Timeout(String),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Snapshot from {url} is not valid JSON")]
    JsonParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snapshot from {0} is not a JSON array of samples")]
    NotAnArray(String),
}

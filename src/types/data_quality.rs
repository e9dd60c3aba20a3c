use serde::{Deserialize, Serialize};

/// One hourly snapshot that could not be retrieved, with the reason as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourFetchError {
    pub hour: u8,
    pub reason: String,
}

/// How complete the hourly snapshot set behind an analysis was.
///
/// Passed through untouched from the retrieval step so callers can show a
/// data-quality warning next to the results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub successful_hours: usize,
    pub failed_hours: usize,
    pub total_requests: usize,
    pub errors: Vec<HourFetchError>,
}

impl DataQuality {
    pub fn is_complete(&self) -> bool {
        self.failed_hours == 0 && self.successful_hours == self.total_requests
    }
}

use thiserror::Error;

/// Failures that end an acquisition cycle.
///
/// The `Display` text of each variant is what the user sees in the error
/// state, so it is written as a complete sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    #[error(
        "Location permission denied. Allow location sharing to see the forecast for where your car is parked."
    )]
    PermissionDenied,

    #[error("{0}")]
    LocationUnavailable(String),

    #[error("{0}")]
    NetworkFailure(String),

    #[error("{0}")]
    MalformedResponse(String),
}

impl ForecastError {
    pub(crate) fn no_daily_data() -> Self {
        ForecastError::MalformedResponse("No daily forecast data received.".to_string())
    }
}

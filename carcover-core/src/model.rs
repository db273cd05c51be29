use serde::{Deserialize, Serialize};

/// Number of days presented, regardless of how many the provider returns.
pub const FORECAST_HORIZON_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

/// Daily temperature range in the provider's unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Provider severity code; `None` when the provider sent none for the day.
    pub code: Option<i32>,
    pub short_label: String,
    pub description: String,
    /// Icon asset reference, empty when the provider has no icons.
    pub icon_ref: String,
}

/// One calendar day's weather summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Unix seconds at local noon of the day.
    pub timestamp: i64,
    pub temperature: Temperature,
    /// Always within `[0.0, 1.0]`.
    pub precipitation_probability: f64,
    pub conditions: Vec<WeatherCondition>,
}

/// Payload of a successful acquisition cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReady {
    pub place_name: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Offset of the forecast location, used to label days.
    pub utc_offset_seconds: i32,
    pub days: Vec<DailyForecast>,
}

/// State of one acquisition cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ForecastResult {
    Loading,
    Error { message: String },
    Ready(ForecastReady),
}

impl ForecastResult {
    pub fn is_loading(&self) -> bool {
        matches!(self, ForecastResult::Loading)
    }
}

use crate::{Config, error::ForecastError, model::{Coordinates, DailyForecast}};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// Normalized output of a provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderForecast {
    /// Offset of the forecast location's timezone.
    pub utc_offset_seconds: i32,
    pub days: Vec<DailyForecast>,
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Fetch daily forecasts for `coordinates`, already normalized.
    async fn fetch_daily(&self, coordinates: Coordinates) -> Result<ProviderForecast, ForecastError>;
}

/// Construct the forecast provider using the configured timeout.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let provider = OpenMeteoProvider::new(config.http_timeout())?;
    Ok(Box::new(provider))
}

#[async_trait]
impl<P: ForecastProvider + ?Sized> ForecastProvider for Box<P> {
    async fn fetch_daily(&self, coordinates: Coordinates) -> Result<ProviderForecast, ForecastError> {
        (**self).fetch_daily(coordinates).await
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::ForecastError,
    model::{Coordinates, DailyForecast, FORECAST_HORIZON_DAYS, Temperature, WeatherCondition},
    provider::{ForecastProvider, ProviderForecast, truncate_body},
};

pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_probability_max,weathercode";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    base_url: String,
}

impl OpenMeteoProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(OPEN_METEO_FORECAST_URL, timeout)
    }

    /// Point the provider at another forecast endpoint, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Open-Meteo HTTP client")?;

        Ok(Self { http, base_url: base_url.into() })
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn fetch_daily(&self, coordinates: Coordinates) -> Result<ProviderForecast, ForecastError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                ForecastError::NetworkFailure(format!("Failed to send request to Open-Meteo: {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            ForecastError::NetworkFailure(format!("Failed to read Open-Meteo response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(ForecastError::NetworkFailure(format!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OpenMeteoResponse = serde_json::from_str(&body).map_err(|e| {
            ForecastError::MalformedResponse(format!("Failed to parse Open-Meteo forecast JSON: {e}"))
        })?;

        let days = normalize(&parsed)?;
        debug!(days = days.len(), timezone = ?parsed.timezone, "normalized Open-Meteo forecast");

        Ok(ProviderForecast { utc_offset_seconds: parsed.utc_offset_seconds.unwrap_or(0), days })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenMeteoResponse {
    #[serde(default)]
    pub utc_offset_seconds: Option<i32>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub daily_units: Option<OmDailyUnits>,
    #[serde(default)]
    pub daily: Option<OmDaily>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmDailyUnits {
    #[serde(default)]
    pub precipitation_probability_max: Option<String>,
}

/// Parallel per-day arrays; entries may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub temperature_2m_min: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub precipitation_probability_max: Option<Vec<Option<f64>>>,
    #[serde(default, alias = "weather_code")]
    pub weathercode: Option<Vec<Option<i32>>>,
}

/// Scale the provider reports precipitation probability in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityScale {
    /// 0 to 100.
    Percent,
    /// Already 0 to 1.
    Unit,
}

impl ProbabilityScale {
    /// Open-Meteo labels percentages with `"%"`; that is also assumed when
    /// the units block is missing.
    pub fn from_unit_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            None | Some("%") => ProbabilityScale::Percent,
            Some(_) => ProbabilityScale::Unit,
        }
    }

    /// Bring a raw provider value to `[0, 1]`. Applied once, at the boundary.
    pub fn to_unit_interval(self, raw: f64) -> f64 {
        if !raw.is_finite() {
            return 0.0;
        }
        let value = match self {
            ProbabilityScale::Percent => raw / 100.0,
            ProbabilityScale::Unit => raw,
        };
        value.clamp(0.0, 1.0)
    }
}

/// Human-readable text for a WMO weather code.
pub fn describe_code(code: i32) -> String {
    let text = match code {
        0 => "Clear sky",
        1 | 2 => "Mainly clear",
        3 => "Cloudy",
        45..=48 => "Fog",
        51..=57 => "Drizzle",
        61..=67 => "Rain",
        71..=77 => "Snow",
        80..=82 => "Rain showers",
        95..=99 => "Thunderstorm",
        other => return format!("Weather code {other}"),
    };
    text.to_string()
}

/// Translate an Open-Meteo response into at most seven daily forecasts.
pub fn normalize(response: &OpenMeteoResponse) -> Result<Vec<DailyForecast>, ForecastError> {
    let daily = response
        .daily
        .as_ref()
        .filter(|d| !d.time.is_empty())
        .ok_or_else(ForecastError::no_daily_data)?;

    let len = daily.time.len();
    let max = required_series("temperature_2m_max", daily.temperature_2m_max.as_deref(), len)?;
    let min = required_series("temperature_2m_min", daily.temperature_2m_min.as_deref(), len)?;
    let pop = optional_series(
        "precipitation_probability_max",
        daily.precipitation_probability_max.as_deref(),
        len,
    )?;
    let codes = optional_series("weathercode", daily.weathercode.as_deref(), len)?;

    let scale = ProbabilityScale::from_unit_label(
        response
            .daily_units
            .as_ref()
            .and_then(|u| u.precipitation_probability_max.as_deref()),
    );
    let offset = response.utc_offset_seconds.unwrap_or(0);

    daily
        .time
        .iter()
        .enumerate()
        .take(FORECAST_HORIZON_DAYS)
        .map(|(i, date)| {
            let timestamp = local_noon_timestamp(date, offset)?;

            let temperature = match (max[i], min[i]) {
                (Some(max), Some(min)) => Temperature { min, max },
                _ => {
                    return Err(ForecastError::MalformedResponse(format!(
                        "Missing temperature for {date}."
                    )));
                }
            };

            let precipitation_probability = pop
                .and_then(|p| p[i])
                .map(|raw| scale.to_unit_interval(raw))
                .unwrap_or(0.0);

            let code = codes.and_then(|c| c[i]);
            let description = code.map(describe_code).unwrap_or_default();

            Ok(DailyForecast {
                timestamp,
                temperature,
                precipitation_probability,
                conditions: vec![WeatherCondition {
                    code,
                    short_label: description.clone(),
                    description,
                    icon_ref: String::new(),
                }],
            })
        })
        .collect()
}

/// Unix seconds of 12:00 on `date` at the given UTC offset.
fn local_noon_timestamp(date: &str, utc_offset_seconds: i32) -> Result<i64, ForecastError> {
    let noon = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .ok_or_else(|| {
            ForecastError::MalformedResponse(format!("Invalid forecast date '{date}'."))
        })?;

    Ok(noon.and_utc().timestamp() - i64::from(utc_offset_seconds))
}

fn required_series<'a, T>(
    name: &str,
    series: Option<&'a [Option<T>]>,
    len: usize,
) -> Result<&'a [Option<T>], ForecastError> {
    let series = series.ok_or_else(|| {
        ForecastError::MalformedResponse(format!("Forecast response is missing '{name}'."))
    })?;
    check_len(name, series, len)
}

fn optional_series<'a, T>(
    name: &str,
    series: Option<&'a [Option<T>]>,
    len: usize,
) -> Result<Option<&'a [Option<T>]>, ForecastError> {
    series.map(|s| check_len(name, s, len)).transpose()
}

fn check_len<'a, T>(
    name: &str,
    series: &'a [Option<T>],
    len: usize,
) -> Result<&'a [Option<T>], ForecastError> {
    if series.len() != len {
        return Err(ForecastError::MalformedResponse(format!(
            "Forecast field '{name}' has {} entries but {len} dates were returned.",
            series.len()
        )));
    }
    Ok(series)
}

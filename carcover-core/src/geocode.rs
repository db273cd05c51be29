//! Reverse geocoding through Nominatim (OpenStreetMap). No API key needed.

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::{error::ForecastError, model::Coordinates};

pub const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const USER_AGENT: &str = concat!("carcover/", env!("CARGO_PKG_VERSION"));

/// One address candidate for a coordinate pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// "City, Region", falling back through smaller and larger localities.
    pub fn place_name(&self) -> Option<String> {
        let non_empty = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).cloned();

        let primary = non_empty(&self.city)
            .or_else(|| non_empty(&self.town))
            .or_else(|| non_empty(&self.village))
            .or_else(|| non_empty(&self.district))
            .or_else(|| non_empty(&self.region))
            .or_else(|| non_empty(&self.country))?;

        let suffix = non_empty(&self.region)
            .filter(|r| *r != primary)
            .or_else(|| non_empty(&self.country).filter(|c| *c != primary));

        Some(match suffix {
            Some(s) => format!("{primary}, {s}"),
            None => primary,
        })
    }
}

/// First usable place name among the candidates.
pub fn place_name(candidates: &[Address]) -> Option<String> {
    candidates.iter().find_map(Address::place_name)
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state_district: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<NominatimAddress> for Address {
    fn from(a: NominatimAddress) -> Self {
        Address {
            city: a.city,
            town: a.town,
            village: a.village.or(a.municipality),
            district: a.state_district.or(a.county),
            region: a.state,
            country: a.country,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(NOMINATIM_REVERSE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build geocoding HTTP client")?;

        Ok(Self { http, base_url: base_url.into() })
    }

    /// Address candidates for `coordinates`; empty when nothing is known there.
    pub async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<Address>, ForecastError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ForecastError::LocationUnavailable(format!("Reverse geocode failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(ForecastError::LocationUnavailable(format!(
                "Reverse geocode returned status {status}"
            )));
        }

        let body: NominatimResponse = res.json().await.map_err(|e| {
            ForecastError::LocationUnavailable(format!("Reverse geocode parse error: {e}"))
        })?;

        if let Some(err) = body.error {
            debug!(%err, "nominatim has no address for coordinates");
            return Ok(Vec::new());
        }

        Ok(body.address.map(Address::from).into_iter().collect())
    }
}

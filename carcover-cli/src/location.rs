use anyhow::Result;
use async_trait::async_trait;
use carcover_core::{
    Address, Config, Coordinates, ForecastError, LocationService, NominatimGeocoder, Permission,
};
use inquire::Confirm;

/// Location source for a terminal session.
///
/// Coordinates come from `--lat/--lon` or the config file. Permission comes
/// from the saved answer, otherwise the user is asked on every cycle.
#[derive(Debug)]
pub struct TerminalLocation {
    share_location: Option<bool>,
    coordinates: Option<Coordinates>,
    geocoder: Option<NominatimGeocoder>,
}

impl TerminalLocation {
    pub fn new(config: &Config, coordinates: Option<Coordinates>) -> Result<Self> {
        let geocoder = if config.reverse_geocode {
            Some(NominatimGeocoder::new(config.http_timeout())?)
        } else {
            None
        };

        Ok(Self {
            share_location: config.share_location,
            coordinates: coordinates.or_else(|| config.coordinates()),
            geocoder,
        })
    }
}

fn prompt_permission() -> bool {
    match Confirm::new("Allow carcover to use your location?")
        .with_default(true)
        .with_help_message("Answer can be saved with `carcover configure`")
        .prompt()
    {
        Ok(answer) => answer,
        Err(err) => {
            tracing::debug!(error = %err, "permission prompt unavailable; treating as denied");
            false
        }
    }
}

#[async_trait]
impl LocationService for TerminalLocation {
    async fn request_permission(&self) -> Permission {
        let allowed = match self.share_location {
            Some(answer) => answer,
            None => tokio::task::spawn_blocking(prompt_permission).await.unwrap_or(false),
        };

        if allowed { Permission::Granted } else { Permission::Denied }
    }

    async fn current_coordinates(&self) -> Result<Coordinates, ForecastError> {
        self.coordinates.ok_or_else(|| {
            ForecastError::LocationUnavailable(
                "No location configured.\n\
                 Hint: run `carcover configure` or pass --lat and --lon."
                    .to_string(),
            )
        })
    }

    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Vec<Address>, ForecastError> {
        match &self.geocoder {
            Some(geocoder) => geocoder.reverse(coordinates).await,
            None => Ok(Vec::new()),
        }
    }
}

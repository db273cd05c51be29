use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::ForecastError, geocode::Address, model::Coordinates};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Host-side access to the device position.
#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    async fn request_permission(&self) -> Permission;

    /// Single snapshot of the current position.
    async fn current_coordinates(&self) -> Result<Coordinates, ForecastError>;

    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Vec<Address>, ForecastError>;
}

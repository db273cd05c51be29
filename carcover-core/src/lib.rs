//! Core library for the `carcover` CLI.
//!
//! This crate defines:
//! - The daily forecast model and the per-day cover advice
//! - The Open-Meteo client and response normalization
//! - The acquisition pipeline and the state slot it publishes to
//! - Configuration handling
//!
//! It is used by `carcover-cli`, but can also be reused by other front ends.

pub mod advice;
pub mod card;
pub mod config;
pub mod error;
pub mod geocode;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod state;

pub use advice::{BadgeColor, CoverAdvice, classify};
pub use card::{DayCard, day_cards};
pub use config::{Config, LocationConfig};
pub use error::ForecastError;
pub use geocode::{Address, NominatimGeocoder};
pub use location::{LocationService, Permission};
pub use model::{Coordinates, DailyForecast, ForecastReady, ForecastResult, Temperature, WeatherCondition};
pub use pipeline::ForecastPipeline;
pub use provider::{ForecastProvider, OpenMeteoProvider, ProviderForecast};
pub use state::ForecastStore;

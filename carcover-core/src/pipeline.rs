//! Forecast acquisition: permission, coordinates, place name and forecast.

use tracing::{debug, info, warn};

use crate::{
    error::ForecastError,
    geocode,
    location::{LocationService, Permission},
    model::{Coordinates, FORECAST_HORIZON_DAYS, ForecastReady},
    provider::ForecastProvider,
    state::ForecastStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    RequestingPermission,
    AwaitingCoordinates,
    AwaitingForecast,
    Ready,
    Error,
}

#[derive(Debug)]
pub struct ForecastPipeline<L, P> {
    location: L,
    provider: P,
}

impl<L: LocationService, P: ForecastProvider> ForecastPipeline<L, P> {
    pub fn new(location: L, provider: P) -> Self {
        Self { location, provider }
    }

    /// Run a full cycle and publish it to `store`.
    ///
    /// Returns `false` if a newer cycle was started while this one ran, in
    /// which case the outcome was dropped.
    pub async fn refresh(&self, store: &ForecastStore) -> bool {
        let cycle = store.begin_cycle();
        let outcome = self.run_cycle(cycle).await;
        store.complete(cycle, outcome)
    }

    pub async fn run_cycle(&self, cycle: u64) -> Result<ForecastReady, ForecastError> {
        let outcome = self.acquire(cycle).await;
        match &outcome {
            Ok(ready) => {
                debug!(cycle, stage = ?Stage::Ready, "forecast cycle finished");
                info!(
                    cycle,
                    days = ready.days.len(),
                    place = ready.place_name.as_deref().unwrap_or("-"),
                    "forecast ready"
                );
            }
            Err(err) => {
                debug!(cycle, stage = ?Stage::Error, "forecast cycle finished");
                warn!(cycle, error = %err, "forecast cycle failed");
            }
        }
        outcome
    }

    async fn acquire(&self, cycle: u64) -> Result<ForecastReady, ForecastError> {
        debug!(cycle, stage = ?Stage::RequestingPermission, "forecast cycle stage");
        if self.location.request_permission().await == Permission::Denied {
            return Err(ForecastError::PermissionDenied);
        }

        debug!(cycle, stage = ?Stage::AwaitingCoordinates, "forecast cycle stage");
        let coordinates = self.location.current_coordinates().await?;

        debug!(cycle, stage = ?Stage::AwaitingForecast, %coordinates, "forecast cycle stage");
        let (place_name, forecast) = tokio::join!(
            self.place_name(cycle, coordinates),
            self.provider.fetch_daily(coordinates),
        );
        let mut forecast = forecast?;

        if forecast.days.is_empty() {
            return Err(ForecastError::no_daily_data());
        }
        forecast.days.truncate(FORECAST_HORIZON_DAYS);

        Ok(ForecastReady {
            place_name,
            coordinates: Some(coordinates),
            utc_offset_seconds: forecast.utc_offset_seconds,
            days: forecast.days,
        })
    }

    /// Best effort; a failure only means the place name is left out.
    async fn place_name(&self, cycle: u64, coordinates: Coordinates) -> Option<String> {
        match self.location.reverse_geocode(coordinates).await {
            Ok(candidates) => geocode::place_name(&candidates),
            Err(err) => {
                debug!(cycle, error = %err, "reverse geocoding failed; continuing without place name");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geocode::Address,
        model::{DailyForecast, ForecastResult, Temperature, WeatherCondition},
        provider::ProviderForecast,
    };
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    struct FakeLocation {
        permission: Permission,
        coordinates: Result<Coordinates, ForecastError>,
        geocode: Result<Vec<Address>, ForecastError>,
    }

    impl FakeLocation {
        fn granted() -> Self {
            Self {
                permission: Permission::Granted,
                coordinates: Ok(Coordinates::new(40.0, -75.0)),
                geocode: Ok(vec![Address {
                    city: Some("Philadelphia".into()),
                    region: Some("Pennsylvania".into()),
                    ..Address::default()
                }]),
            }
        }
    }

    #[async_trait]
    impl LocationService for FakeLocation {
        async fn request_permission(&self) -> Permission {
            self.permission
        }

        async fn current_coordinates(&self) -> Result<Coordinates, ForecastError> {
            self.coordinates.clone()
        }

        async fn reverse_geocode(&self, _: Coordinates) -> Result<Vec<Address>, ForecastError> {
            self.geocode.clone()
        }
    }

    #[derive(Debug, Clone)]
    struct FakeProvider {
        days: usize,
        calls: Arc<AtomicUsize>,
        fail: Option<ForecastError>,
    }

    impl FakeProvider {
        fn with_days(days: usize) -> Self {
            Self { days, calls: Arc::new(AtomicUsize::new(0)), fail: None }
        }
    }

    #[async_trait]
    impl ForecastProvider for FakeProvider {
        async fn fetch_daily(&self, _: Coordinates) -> Result<ProviderForecast, ForecastError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.fail {
                return Err(err.clone());
            }
            let days = (0..self.days)
                .map(|i| DailyForecast {
                    timestamp: 1_763_398_800 + i as i64 * 86_400,
                    temperature: Temperature { min: 0.0, max: i as f64 },
                    precipitation_probability: 0.1,
                    conditions: vec![WeatherCondition {
                        code: Some(0),
                        short_label: "Clear sky".into(),
                        description: "Clear sky".into(),
                        icon_ref: String::new(),
                    }],
                })
                .collect();
            Ok(ProviderForecast { utc_offset_seconds: -18_000, days })
        }
    }

    #[tokio::test]
    async fn ready_with_place_name() {
        let pipeline = ForecastPipeline::new(FakeLocation::granted(), FakeProvider::with_days(3));
        let ready = pipeline.run_cycle(1).await.unwrap();

        assert_eq!(ready.place_name.as_deref(), Some("Philadelphia, Pennsylvania"));
        assert_eq!(ready.coordinates, Some(Coordinates::new(40.0, -75.0)));
        assert_eq!(ready.utc_offset_seconds, -18_000);
        assert_eq!(ready.days.len(), 3);
    }

    #[tokio::test]
    async fn permission_denied_skips_network() {
        let provider = FakeProvider::with_days(3);
        let calls = provider.calls.clone();
        let location = FakeLocation { permission: Permission::Denied, ..FakeLocation::granted() };
        let pipeline = ForecastPipeline::new(location, provider);

        let store = ForecastStore::new();
        assert!(pipeline.refresh(&store).await);

        match store.current() {
            ForecastResult::Error { message } => {
                assert!(message.contains("Location permission denied"))
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn coordinates_failure_is_fatal() {
        let location = FakeLocation {
            coordinates: Err(ForecastError::LocationUnavailable("Location services are off".into())),
            ..FakeLocation::granted()
        };
        let provider = FakeProvider::with_days(3);
        let calls = provider.calls.clone();
        let pipeline = ForecastPipeline::new(location, provider);

        let err = pipeline.run_cycle(1).await.unwrap_err();
        assert_eq!(err.to_string(), "Location services are off");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn geocode_failure_is_swallowed() {
        let location = FakeLocation {
            geocode: Err(ForecastError::LocationUnavailable("no network".into())),
            ..FakeLocation::granted()
        };
        let pipeline = ForecastPipeline::new(location, FakeProvider::with_days(2));

        let ready = pipeline.run_cycle(1).await.unwrap();
        assert_eq!(ready.place_name, None);
        assert_eq!(ready.days.len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_surfaces() {
        let provider = FakeProvider {
            fail: Some(ForecastError::NetworkFailure("status 500".into())),
            ..FakeProvider::with_days(0)
        };
        let pipeline = ForecastPipeline::new(FakeLocation::granted(), provider);

        let err = pipeline.run_cycle(1).await.unwrap_err();
        assert_eq!(err, ForecastError::NetworkFailure("status 500".into()));
    }

    #[tokio::test]
    async fn empty_forecast_is_malformed() {
        let pipeline = ForecastPipeline::new(FakeLocation::granted(), FakeProvider::with_days(0));
        let err = pipeline.run_cycle(1).await.unwrap_err();
        assert_eq!(err.to_string(), "No daily forecast data received.");
    }

    #[tokio::test]
    async fn truncates_to_horizon() {
        let pipeline = ForecastPipeline::new(FakeLocation::granted(), FakeProvider::with_days(10));
        let ready = pipeline.run_cycle(1).await.unwrap();
        assert_eq!(ready.days.len(), 7);
        assert_eq!(ready.days[6].temperature.max, 6.0);
    }

    #[tokio::test]
    async fn refresh_reacquires_everything() {
        let provider = FakeProvider::with_days(1);
        let calls = provider.calls.clone();
        let pipeline = ForecastPipeline::new(FakeLocation::granted(), provider);
        let store = ForecastStore::new();

        assert!(pipeline.refresh(&store).await);
        assert!(pipeline.refresh(&store).await);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.latest_cycle(), 2);
        assert!(matches!(store.current(), ForecastResult::Ready(_)));
    }
}

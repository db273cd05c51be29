//! View-model for the per-day list.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::{
    advice::{BadgeColor, CoverAdvice, classify},
    model::{DailyForecast, ForecastReady},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCard {
    /// "Today" for the first day, the weekday name after that.
    pub day_name: String,
    /// e.g. "Nov 17".
    pub date_label: String,
    pub description: String,
    pub icon_ref: Option<String>,
    pub max_temp: i64,
    pub min_temp: i64,
    pub advice: CoverAdvice,
    pub label: &'static str,
    pub color: BadgeColor,
}

impl DayCard {
    pub fn new(index: usize, day: &DailyForecast, tz: FixedOffset) -> Self {
        let local = DateTime::<Utc>::from_timestamp(day.timestamp, 0).map(|dt| dt.with_timezone(&tz));

        let day_name = match (index, local) {
            (0, _) => "Today".to_string(),
            (_, Some(dt)) => dt.format("%A").to_string(),
            (_, None) => String::new(),
        };
        let date_label = local.map(|dt| dt.format("%b %-d").to_string()).unwrap_or_default();

        let condition = day.conditions.first();
        let description = condition.map(|c| c.description.clone()).unwrap_or_default();
        let icon_ref = condition
            .map(|c| c.icon_ref.clone())
            .filter(|icon| !icon.is_empty());

        let advice = classify(day);

        Self {
            day_name,
            date_label,
            description,
            icon_ref,
            max_temp: day.temperature.max.round() as i64,
            min_temp: day.temperature.min.round() as i64,
            advice,
            label: advice.label(),
            color: advice.color(),
        }
    }
}

/// Header line: place name, or the coordinates when it is unknown.
pub fn heading(ready: &ForecastReady) -> String {
    match (&ready.place_name, ready.coordinates) {
        (Some(name), _) => name.clone(),
        (None, Some(coords)) => coords.to_string(),
        (None, None) => "Current location".to_string(),
    }
}

pub fn day_cards(ready: &ForecastReady) -> Vec<DayCard> {
    let tz = FixedOffset::east_opt(ready.utc_offset_seconds).unwrap_or_else(|| Utc.fix());
    ready
        .days
        .iter()
        .enumerate()
        .map(|(i, day)| DayCard::new(i, day, tz))
        .collect()
}

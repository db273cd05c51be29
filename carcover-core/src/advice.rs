//! Per-day cover recommendation.
//!
//! The label of the highest-urgency category reads "No cover needed" while
//! its badge is red. Both are kept exactly as shown to users today.

use serde::{Deserialize, Serialize};

use crate::model::DailyForecast;

/// Code used when a day carries no condition (clear sky).
pub const CLEAR_SKY_CODE: i32 = 800;

const HIGH_PRECIPITATION: f64 = 0.4;
const MODERATE_PRECIPITATION: f64 = 0.2;
const SEVERE_CODES: std::ops::Range<i32> = 200..600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverAdvice {
    Cover,
    Optional,
    NoCoverNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Green,
    Orange,
    Red,
}

impl CoverAdvice {
    pub fn label(&self) -> &'static str {
        match self {
            CoverAdvice::Cover => "Cover your car",
            CoverAdvice::Optional => "Cover optional",
            CoverAdvice::NoCoverNeeded => "No cover needed",
        }
    }

    pub fn color(&self) -> BadgeColor {
        match self {
            CoverAdvice::Cover => BadgeColor::Green,
            CoverAdvice::Optional => BadgeColor::Orange,
            CoverAdvice::NoCoverNeeded => BadgeColor::Red,
        }
    }
}

impl std::fmt::Display for CoverAdvice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl BadgeColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Green => "green",
            BadgeColor::Orange => "orange",
            BadgeColor::Red => "red",
        }
    }
}

/// Classify a day. Total: days without conditions count as clear sky.
pub fn classify(day: &DailyForecast) -> CoverAdvice {
    let pop = if day.precipitation_probability.is_nan() {
        0.0
    } else {
        day.precipitation_probability
    };

    let code = day
        .conditions
        .first()
        .and_then(|c| c.code)
        .unwrap_or(CLEAR_SKY_CODE);

    if pop >= HIGH_PRECIPITATION || SEVERE_CODES.contains(&code) {
        CoverAdvice::NoCoverNeeded
    } else if pop >= MODERATE_PRECIPITATION {
        CoverAdvice::Optional
    } else {
        CoverAdvice::Cover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Temperature, WeatherCondition};

    fn day(pop: f64, code: Option<i32>) -> DailyForecast {
        DailyForecast {
            timestamp: 1_763_398_800,
            temperature: Temperature { min: 5.0, max: 15.0 },
            precipitation_probability: pop,
            conditions: vec![WeatherCondition {
                code,
                short_label: String::new(),
                description: String::new(),
                icon_ref: String::new(),
            }],
        }
    }

    #[test]
    fn high_precipitation_is_red_for_any_code() {
        for code in [Some(0), Some(3), Some(61), Some(250), Some(800), Some(900), None] {
            for pop in [0.4, 0.55, 1.0] {
                let advice = classify(&day(pop, code));
                assert_eq!(advice, CoverAdvice::NoCoverNeeded, "pop={pop} code={code:?}");
                assert_eq!(advice.color(), BadgeColor::Red);
            }
        }
    }

    #[test]
    fn severe_code_is_red_with_low_precipitation() {
        for code in [200, 201, 300, 500, 599] {
            for pop in [0.0, 0.1, 0.25, 0.39] {
                assert_eq!(classify(&day(pop, Some(code))), CoverAdvice::NoCoverNeeded);
            }
        }
    }

    #[test]
    fn moderate_precipitation_is_optional() {
        for code in [Some(0), Some(61), Some(199), Some(600), Some(800), None] {
            for pop in [0.2, 0.3, 0.399] {
                assert_eq!(classify(&day(pop, code)), CoverAdvice::Optional, "pop={pop}");
            }
        }
    }

    #[test]
    fn low_precipitation_means_cover() {
        for code in [Some(0), Some(95), Some(600), Some(800), None] {
            for pop in [0.0, 0.05, 0.199] {
                assert_eq!(classify(&day(pop, code)), CoverAdvice::Cover);
            }
        }
    }

    #[test]
    fn missing_conditions_default_to_clear_sky() {
        let mut d = day(0.0, Some(250));
        d.conditions.clear();
        assert_eq!(classify(&d), CoverAdvice::Cover);
    }

    #[test]
    fn nan_probability_counts_as_zero() {
        assert_eq!(classify(&day(f64::NAN, None)), CoverAdvice::Cover);
    }

    #[test]
    fn display_table() {
        assert_eq!(CoverAdvice::Cover.label(), "Cover your car");
        assert_eq!(CoverAdvice::Cover.color(), BadgeColor::Green);
        assert_eq!(CoverAdvice::Optional.label(), "Cover optional");
        assert_eq!(CoverAdvice::Optional.color(), BadgeColor::Orange);
        assert_eq!(CoverAdvice::NoCoverNeeded.to_string(), "No cover needed");
        assert_eq!(BadgeColor::Red.as_str(), "red");
    }
}

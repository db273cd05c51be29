use std::fmt::Write;

use carcover_core::{BadgeColor, DayCard, ForecastResult, card, day_cards};
use crossterm::style::{Color, Stylize};
use serde_json::{Value, json};

fn badge_color(color: BadgeColor) -> Color {
    match color {
        BadgeColor::Green => Color::Green,
        BadgeColor::Orange => Color::Rgb { r: 255, g: 165, b: 0 },
        BadgeColor::Red => Color::Red,
    }
}

fn badge(card: &DayCard, colored: bool) -> String {
    if colored {
        format!(" {} ", card.label).black().on(badge_color(card.color)).to_string()
    } else {
        format!("[{}] {}", card.color.as_str(), card.label)
    }
}

fn card_line(card: &DayCard, colored: bool) -> String {
    let mut line = format!(
        "{:<10} {:<7} {:<14} {:>4}° / {:>3}°  {}",
        card.day_name,
        card.date_label,
        card.description,
        card.max_temp,
        card.min_temp,
        badge(card, colored),
    );
    if let Some(icon) = &card.icon_ref {
        // writing to a String cannot fail
        let _ = write!(line, "  ({icon})");
    }
    line
}

/// Text for one state of the forecast slot.
pub fn render(result: &ForecastResult, colored: bool) -> String {
    match result {
        ForecastResult::Loading => "Loading forecast…".to_string(),
        ForecastResult::Error { message } => {
            if colored {
                format!("{} {message}", "Error:".red().bold())
            } else {
                format!("Error: {message}")
            }
        }
        ForecastResult::Ready(ready) => {
            let heading = card::heading(ready);
            let mut out = if colored { heading.bold().to_string() } else { heading };
            out.push('\n');
            for c in day_cards(ready) {
                out.push_str("  ");
                out.push_str(&card_line(&c, colored));
                out.push('\n');
            }
            out
        }
    }
}

pub fn render_json(result: &ForecastResult) -> Value {
    match result {
        ForecastResult::Ready(ready) => json!({
            "state": "ready",
            "place_name": ready.place_name,
            "coordinates": ready.coordinates,
            "days": day_cards(ready),
        }),
        other => serde_json::to_value(other).unwrap_or(Value::Null),
    }
}

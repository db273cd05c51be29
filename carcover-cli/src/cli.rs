use std::{io::IsTerminal, process::ExitCode};

use anyhow::Context;
use carcover_core::{
    Config, Coordinates, ForecastPipeline, ForecastResult, ForecastStore, config::validate_coordinates,
    provider::{ForecastProvider, provider_from_config},
};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType};

use crate::{location::TerminalLocation, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "carcover", version, about = "Should you cover your car this week?")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save where the car is parked and whether location may be used.
    Configure,

    /// Fetch the 7-day forecast once and print the advice.
    Show {
        #[command(flatten)]
        position: PositionArgs,

        /// Print JSON instead of cards.
        #[arg(long)]
        json: bool,
    },

    /// Like `show`, then offer to refresh until declined.
    Watch {
        #[command(flatten)]
        position: PositionArgs,
    },
}

#[derive(Debug, Args)]
pub struct PositionArgs {
    /// Latitude override, in decimal degrees.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude override, in decimal degrees.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> anyhow::Result<Option<Coordinates>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                validate_coordinates(lat, lon)?;
                Ok(Some(Coordinates::new(lat, lon)))
            }
            _ => Ok(None),
        }
    }
}

type Pipeline = ForecastPipeline<TerminalLocation, Box<dyn ForecastProvider>>;

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { position, json } => {
                let pipeline = build_pipeline(&position)?;
                let store = ForecastStore::new();
                let result = cycle(&pipeline, &store, !json).await;

                if json {
                    println!("{}", serde_json::to_string_pretty(&render::render_json(&result))?);
                }
                Ok(exit_code(&result))
            }
            Command::Watch { position } => {
                let pipeline = build_pipeline(&position)?;
                let store = ForecastStore::new();

                loop {
                    let result = cycle(&pipeline, &store, true).await;

                    let again = tokio::task::spawn_blocking(|| {
                        Confirm::new("Refresh forecast?").with_default(true).prompt()
                    })
                    .await
                    .context("Refresh prompt task failed")?;

                    match again {
                        Ok(true) => continue,
                        Ok(false) | Err(_) => return Ok(exit_code(&result)),
                    }
                }
            }
        }
    }
}

fn build_pipeline(position: &PositionArgs) -> anyhow::Result<Pipeline> {
    let config = Config::load()?;
    let location = TerminalLocation::new(&config, position.coordinates()?)?;
    let provider = provider_from_config(&config)?;
    Ok(ForecastPipeline::new(location, provider))
}

/// One acquisition cycle, printed as it progresses when `print` is set.
async fn cycle(pipeline: &Pipeline, store: &ForecastStore, print: bool) -> ForecastResult {
    let colored = std::io::stdout().is_terminal();

    if print {
        eprintln!("{}", render::render(&ForecastResult::Loading, colored));
    }
    pipeline.refresh(store).await;

    let result = store.current();
    if print {
        println!("{}", render::render(&result, colored));
    }
    result
}

fn failed(result: &ForecastResult) -> bool {
    matches!(result, ForecastResult::Error { .. })
}

fn exit_code(result: &ForecastResult) -> ExitCode {
    if failed(result) { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let current = config.coordinates();

    let mut lat_prompt = CustomType::<f64>::new("Latitude of your parking spot:")
        .with_error_message("Please enter a number, e.g. 40.0");
    let mut lon_prompt = CustomType::<f64>::new("Longitude of your parking spot:")
        .with_error_message("Please enter a number, e.g. -75.0");
    if let Some(c) = current {
        lat_prompt = lat_prompt.with_default(c.latitude);
        lon_prompt = lon_prompt.with_default(c.longitude);
    }

    let latitude = lat_prompt.prompt().context("Latitude prompt cancelled")?;
    let longitude = lon_prompt.prompt().context("Longitude prompt cancelled")?;
    config.set_location(latitude, longitude)?;

    let share = Confirm::new("Allow carcover to use this location for forecasts?")
        .with_default(config.share_location.unwrap_or(true))
        .prompt()
        .context("Permission prompt cancelled")?;
    config.share_location = Some(share);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_negative_longitude() {
        let cli = Cli::try_parse_from(["carcover", "show", "--lat", "40.0", "--lon", "-75.0", "--json"])
            .unwrap();
        match cli.command {
            Command::Show { position, json } => {
                assert!(json);
                assert_eq!(position.coordinates().unwrap(), Some(Coordinates::new(40.0, -75.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["carcover", "watch", "--lat", "40.0"]).is_err());
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let position = PositionArgs { lat: Some(100.0), lon: Some(0.0) };
        assert!(position.coordinates().is_err());
    }

    #[test]
    fn only_error_state_fails() {
        assert!(failed(&ForecastResult::Error { message: "x".into() }));
        assert!(!failed(&ForecastResult::Loading));
    }
}

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode};
use weatherview_core::{
    Config, Coordinate, FixedLocation, HttpMapLoader, IpApiLocator, LocationProvider,
    Orchestrator, WeatherType, map::DEFAULT_MAP_SCRIPT_URL, provider::provider_from_config,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherview", version, about = "Current and historical weather for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Daily,
    Historical,
    Map,
}

impl From<Mode> for WeatherType {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Daily => WeatherType::Daily,
            Mode::Historical => WeatherType::Historical,
            Mode::Map => WeatherType::Map,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show weather for the current location.
    Show {
        /// Which view to build.
        #[arg(value_enum, default_value = "daily")]
        mode: Mode,

        /// Latitude; skips location detection when given with --lon.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude; skips location detection when given with --lat.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Print the final view state as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { mode, lat, lon, json } => {
                let flag_location = lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon));
                show(mode.into(), flag_location, json).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    cfg.set_api_key(api_key.trim().to_string());
    let path = cfg.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(
    weather_type: WeatherType,
    flag_location: Option<Coordinate>,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = Config::load()?;

    let provider = Arc::new(provider_from_config(&cfg)?);
    let map_url = cfg.map_script_url.as_deref().unwrap_or(DEFAULT_MAP_SCRIPT_URL);
    let map_loader = Arc::new(HttpMapLoader::new(map_url));

    let orch = Orchestrator::new(provider, map_loader).with_location_timeout(cfg.location_timeout());

    let locator: Box<dyn LocationProvider> = match flag_location.or(cfg.location) {
        Some(coord) => Box::new(FixedLocation(coord)),
        None => Box::new(IpApiLocator::new()),
    };

    if let Err(err) = orch.locate(locator.as_ref()).await {
        tracing::warn!(error = %err, "continuing without a location fix");
    }

    orch.select(weather_type);
    let mut state = orch.settled().await;

    if weather_type == WeatherType::Map && !state.map_loaded && state.map_error.is_none() {
        let mut rx = orch.subscribe();
        if let Ok(ready) = rx.wait_for(|s| s.map_loaded || s.map_error.is_some()).await {
            state = ready.clone();
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", output::render(&state));
    }

    match &state.error {
        Some(err) => Err(anyhow::anyhow!("Weather request failed: {err}")),
        None => Ok(()),
    }
}

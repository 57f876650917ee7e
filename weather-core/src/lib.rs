//! Core library for the `weatherview` app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Typed OpenWeather One Call client and location providers
//! - Date and icon formatting for display
//! - The view state, its reducer, and the orchestrator that drives fetches
//!
//! It is used by `weatherview-cli`, but can also back other front-ends that
//! observe the state channel.

pub mod config;
pub mod error;
pub mod format;
pub mod location;
pub mod map;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod state;

pub use config::Config;
pub use error::{FetchError, LocationError};
pub use location::{FixedLocation, IpApiLocator, LocationProvider};
pub use map::{HttpMapLoader, MapLoader, MapSession, MapView};
pub use model::{Coordinate, DayLabel, ForecastSnapshot, HistoricalEntry, WeatherType};
pub use orchestrator::Orchestrator;
pub use provider::{OpenWeatherClient, WeatherProvider};
pub use state::{Action, ViewState};

use crate::{Config, error::FetchError, model::{Coordinate, ForecastSnapshot}};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Source of current and point-in-time weather readings.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions at `coord`.
    async fn fetch_current(&self, coord: Coordinate) -> Result<ForecastSnapshot, FetchError>;

    /// Conditions at `coord` for the past Unix timestamp `dt`.
    async fn fetch_historical(
        &self,
        coord: Coordinate,
        dt: i64,
    ) -> Result<ForecastSnapshot, FetchError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.resolve_api_key()?;

    let client = match config.api_base_url.as_deref() {
        Some(base) => OpenWeatherClient::with_base_url(api_key, base),
        None => OpenWeatherClient::new(api_key),
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_uses_configured_base_url() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.api_base_url = Some("http://localhost:9999/data/2.5/".to_string());

        let client = provider_from_config(&cfg).expect("key is configured");
        assert_eq!(client.base_url(), "http://localhost:9999/data/2.5");
    }

    #[test]
    fn provider_from_config_defaults_base_url() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let client = provider_from_config(&cfg).expect("key is configured");
        assert_eq!(client.base_url(), openweather::DEFAULT_BASE_URL);
    }
}

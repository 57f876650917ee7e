use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    error::{FetchError, truncate_body},
    model::{Coordinate, ForecastSnapshot},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Client against a different One Call root, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(endpoint = what, %url, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(endpoint = what, %status, "OpenWeather request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|err| FetchError::Decode(format!("OpenWeather {what} JSON: {err}")))
    }
}

#[derive(Debug, Deserialize)]
struct OwOneCallResponse {
    current: ForecastSnapshot,
}

#[derive(Debug, Deserialize)]
struct OwTimeMachineResponse {
    // 3.0 returns `data: [..]`, 2.5 returns `current`.
    current: Option<ForecastSnapshot>,
    #[serde(default)]
    data: Vec<ForecastSnapshot>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, coord: Coordinate) -> Result<ForecastSnapshot, FetchError> {
        let parsed: OwOneCallResponse = self
            .get_json(
                "current",
                "onecall",
                &[
                    ("lat", coord.latitude.to_string()),
                    ("lon", coord.longitude.to_string()),
                    ("exclude", "hourly,daily".to_string()),
                    ("units", "metric".to_string()),
                ],
            )
            .await?;

        Ok(parsed.current)
    }

    async fn fetch_historical(
        &self,
        coord: Coordinate,
        dt: i64,
    ) -> Result<ForecastSnapshot, FetchError> {
        let parsed: OwTimeMachineResponse = self
            .get_json(
                "timemachine",
                "onecall/timemachine",
                &[
                    ("lat", coord.latitude.to_string()),
                    ("lon", coord.longitude.to_string()),
                    ("dt", dt.to_string()),
                    ("units", "metric".to_string()),
                ],
            )
            .await?;

        parsed
            .current
            .or_else(|| parsed.data.into_iter().next())
            .ok_or_else(|| {
                FetchError::Decode("OpenWeather timemachine response contained no data".into())
            })
    }
}

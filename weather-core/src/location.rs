//! One-shot location lookups.
//!
//! A [`LocationProvider`] answers once with a coordinate or a
//! [`LocationError`]; retrying and timing out are the caller's concern.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{error::LocationError, model::Coordinate};

pub const IP_API_URL: &str = "http://ip-api.com/json";

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_location(&self) -> Result<Coordinate, LocationError>;
}

/// A location known up front, from flags or config.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// Approximate location from the public IP address via ip-api.com.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    url: String,
    http: Client,
}

impl IpApiLocator {
    pub fn new() -> Self {
        Self::with_url(IP_API_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self { url: url.to_string(), http: Client::new() }
    }
}

impl Default for IpApiLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

#[async_trait]
impl LocationProvider for IpApiLocator {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        tracing::debug!(url = %self.url, "requesting IP geolocation");

        let res = self.http.get(&self.url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(LocationError::Request(format!("ip-api returned status {status}")));
        }

        let body: IpApiResponse = res.json().await?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                tracing::info!(lat, lon, city = body.city.as_deref().unwrap_or("?"), "location resolved");
                Ok(Coordinate::new(lat, lon))
            }
            _ => Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| format!("ip-api status '{}'", body.status)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_location_returns_its_coordinate() {
        let loc = FixedLocation(Coordinate::new(48.85, 2.35));
        assert_eq!(loc.current_location().await, Ok(Coordinate::new(48.85, 2.35)));
    }
}

//! Map marker state and the lazily loaded map resource.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc};
use tokio::sync::OnceCell;

use crate::{
    error::{FetchError, truncate_body},
    model::Coordinate,
};

pub const DEFAULT_MAP_SCRIPT_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
pub const DEFAULT_ZOOM: u8 = 10;
const CALLBACK_NAME: &str = "callback";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapMarkerState {
    pub position: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub marker: MapMarkerState,
}

impl Default for MapView {
    fn default() -> Self {
        Self { center: Coordinate::default(), zoom: DEFAULT_ZOOM, marker: MapMarkerState::default() }
    }
}

impl MapView {
    /// Move both the marker and the center to `coord`.
    pub fn place_marker(self, coord: Coordinate) -> Self {
        Self { center: coord, marker: MapMarkerState { position: coord }, ..self }
    }

    /// OpenStreetMap link centred on the marker.
    pub fn link(&self) -> String {
        let Coordinate { latitude, longitude } = self.marker.position;
        format!(
            "https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map={}/{latitude}/{longitude}",
            self.zoom
        )
    }
}

/// Fetches whatever the map needs before it can be shown.
#[async_trait]
pub trait MapLoader: Send + Sync + Debug {
    async fn load(&self) -> Result<(), FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpMapLoader {
    script_url: String,
    http: Client,
}

impl HttpMapLoader {
    pub fn new(script_url: &str) -> Self {
        Self { script_url: script_url.to_string(), http: Client::new() }
    }
}

impl Default for HttpMapLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_SCRIPT_URL)
    }
}

#[async_trait]
impl MapLoader for HttpMapLoader {
    async fn load(&self) -> Result<(), FetchError> {
        tracing::debug!(url = %self.script_url, "loading map script");

        let res = self
            .http
            .get(&self.script_url)
            .query(&[(CALLBACK_NAME, CALLBACK_NAME)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        res.bytes().await?;
        Ok(())
    }
}

/// Runs a [`MapLoader`] at most once and remembers the outcome.
#[derive(Debug)]
pub struct MapSession {
    loader: Arc<dyn MapLoader>,
    loaded: OnceCell<Result<(), FetchError>>,
}

impl MapSession {
    pub fn new(loader: Arc<dyn MapLoader>) -> Self {
        Self { loader, loaded: OnceCell::new() }
    }

    /// Load on first call; every later call returns the first outcome.
    pub async fn ensure_loaded(&self) -> Result<(), FetchError> {
        self.loaded.get_or_init(|| async { self.loader.load().await }).await.clone()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.loaded.get(), Some(Ok(())))
    }
}

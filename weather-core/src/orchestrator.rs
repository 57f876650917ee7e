//! Coordinates location lookup, weather fetches and map loading for the view.
//!
//! The orchestrator owns the only writer of the [`ViewState`] channel. Each
//! call to [`Orchestrator::select`] starts a new generation: the fetch tasks
//! of the previous mode are aborted and any result that still slips through
//! is discarded by the reducer.

use chrono::Utc;
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinSet};

use crate::{
    error::LocationError,
    format::{day_label, icon_url},
    location::LocationProvider,
    map::{MapLoader, MapSession},
    model::{Coordinate, HistoricalEntry, WeatherType},
    provider::WeatherProvider,
    state::{Action, ViewState},
};

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const HISTORY_DAYS: i64 = 5;
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// `now - 86400*k` for k in 1..=5, newest first.
pub fn historical_timestamps(now: i64) -> Vec<i64> {
    (1..=HISTORY_DAYS).map(|k| now - SECONDS_PER_DAY * k).collect()
}

/// Fetch tasks belonging to one view mode.
struct TaskGroup {
    kind: WeatherType,
    tasks: JoinSet<()>,
}

impl TaskGroup {
    fn new(kind: WeatherType) -> Self {
        Self { kind, tasks: JoinSet::new() }
    }
}

/// Shared handle to the state channel; every mutation goes through the reducer.
#[derive(Clone)]
struct Store(Arc<watch::Sender<ViewState>>);

impl Store {
    fn dispatch(&self, action: Action) {
        self.0.send_modify(|state| {
            let prev = std::mem::take(state);
            *state = prev.reduce(action);
        });
    }

    fn snapshot(&self) -> ViewState {
        self.0.borrow().clone()
    }
}

/// Drives the view: owns the state channel, the per-mode fetch tasks and the
/// map session. Observe it through [`Orchestrator::subscribe`] or
/// [`Orchestrator::snapshot`].
pub struct Orchestrator {
    provider: Arc<dyn WeatherProvider>,
    map: Arc<MapSession>,
    store: Store,
    tasks: Mutex<TaskGroup>,
    location_timeout: Duration,
    clock: fn() -> i64,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider)
            .field("map", &self.map)
            .field("location_timeout", &self.location_timeout)
            .finish_non_exhaustive()
    }
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn WeatherProvider>, map_loader: Arc<dyn MapLoader>) -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        Self {
            provider,
            map: Arc::new(MapSession::new(map_loader)),
            store: Store(Arc::new(tx)),
            tasks: Mutex::new(TaskGroup::new(WeatherType::default())),
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            clock: unix_now,
        }
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    /// Replace the source of "now" (Unix seconds) used for history timestamps.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn snapshot(&self) -> ViewState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.store.0.subscribe()
    }

    /// Wait until no fetch of the active mode is outstanding.
    pub async fn settled(&self) -> ViewState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Ask `locator` for a fix, bounded by the location timeout.
    ///
    /// Either way the marker is placed and a check is scheduled that flags the
    /// location as unavailable if the marker is still at `{0,0}` when it fires.
    pub async fn locate(
        &self,
        locator: &dyn LocationProvider,
    ) -> Result<Coordinate, LocationError> {
        let lookup = tokio::time::timeout(self.location_timeout, locator.current_location());
        let result = match lookup.await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        };

        match &result {
            Ok(coord) => {
                tracing::info!(%coord, "location acquired");
                self.store.dispatch(Action::LocationResolved(*coord));
            }
            Err(err) => {
                tracing::warn!(error = %err, "location unavailable, keeping default coordinate");
                self.store.dispatch(Action::LocationFailed(err.to_string()));
            }
        }

        self.schedule_marker_check();
        result
    }

    /// Overwrite the coordinate directly, e.g. from a user-entered position.
    pub fn set_coordinate(&self, coord: Coordinate) {
        self.store.dispatch(Action::LocationResolved(coord));
        self.schedule_marker_check();
    }

    fn schedule_marker_check(&self) {
        let store = self.store.clone();
        let delay = self.location_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.dispatch(Action::MarkerCheckElapsed);
        });
    }

    /// Switch the view mode and start its fetches.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn select(&self, weather_type: WeatherType) {
        let mut group = self.tasks.lock();
        if !group.tasks.is_empty() {
            tracing::debug!(previous = %group.kind, "cancelling outstanding fetches");
        }
        group.tasks.abort_all();
        *group = TaskGroup::new(weather_type);

        self.store.dispatch(Action::Select(weather_type));
        let generation = self.store.snapshot().generation;
        tracing::info!(%weather_type, generation, "view mode selected");

        match weather_type {
            WeatherType::Daily => self.start_daily(&mut group.tasks, generation),
            WeatherType::Historical => self.start_historical(&mut group.tasks, generation),
            WeatherType::Map => self.start_map(generation),
        }
    }

    fn start_daily(&self, tasks: &mut JoinSet<()>, generation: u64) {
        let coord = self.store.snapshot().coordinate;
        self.store.dispatch(Action::Dispatched { generation, timestamps: Vec::new(), pending: 1 });

        let provider = self.provider.clone();
        let store = self.store.clone();
        tasks.spawn(async move {
            let action = match provider.fetch_current(coord).await {
                Ok(snapshot) => {
                    let label = day_label(snapshot.dt);
                    let icon_url = snapshot.icon().map(icon_url);
                    Action::CurrentLoaded { generation, snapshot, label, icon_url }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "current weather fetch failed");
                    Action::FetchFailed { generation, reason: err.to_string() }
                }
            };
            store.dispatch(action);
        });
    }

    fn start_historical(&self, tasks: &mut JoinSet<()>, generation: u64) {
        let coord = self.store.snapshot().coordinate;
        let timestamps = historical_timestamps((self.clock)());
        self.store.dispatch(Action::Dispatched {
            generation,
            timestamps: timestamps.clone(),
            pending: timestamps.len(),
        });

        for dt in timestamps {
            let provider = self.provider.clone();
            let store = self.store.clone();
            tasks.spawn(async move {
                let action = match provider.fetch_historical(coord, dt).await {
                    Ok(snapshot) => {
                        let label = day_label(snapshot.dt);
                        Action::HistoricalLoaded { generation, entry: HistoricalEntry { snapshot, label } }
                    }
                    Err(err) => {
                        tracing::warn!(dt, error = %err, "historical weather fetch failed");
                        Action::FetchFailed { generation, reason: err.to_string() }
                    }
                };
                store.dispatch(action);
            });
        }
    }

    fn start_map(&self, generation: u64) {
        self.store.dispatch(Action::Dispatched { generation, timestamps: Vec::new(), pending: 0 });

        if self.map.is_loaded() {
            return;
        }

        // Detached from the task group: switching modes must not abort the load.
        let map = self.map.clone();
        let store = self.store.clone();
        tokio::spawn(async move {
            match map.ensure_loaded().await {
                Ok(()) => store.dispatch(Action::MapReady),
                Err(err) => {
                    tracing::warn!(error = %err, "map resource failed to load");
                    store.dispatch(Action::MapFailed(err.to_string()));
                }
            }
        });
    }
}

//! Immutable view state and the reducer that advances it.
//!
//! Every change to what the user sees is an [`Action`] applied with
//! [`ViewState::reduce`]. Fetch results carry the generation they were
//! dispatched under; results from an older generation are dropped, so a
//! late response can never leak into a view the user has since left.

use serde::{Deserialize, Serialize};

use crate::{
    map::MapView,
    model::{Coordinate, DayLabel, ForecastSnapshot, HistoricalEntry, WeatherType},
};

/// Everything the view shows, as one immutable snapshot.
///
/// `error` holds the first failure of the active mode and `failures` counts
/// all of them; both reset when a new mode is selected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub weather_type: WeatherType,
    pub loading: bool,
    pub coordinate: Coordinate,
    pub map: MapView,
    pub location_loaded: bool,
    pub location_unavailable: bool,
    pub location_error: Option<String>,
    pub forecast: Option<ForecastSnapshot>,
    pub date_label: Option<DayLabel>,
    pub icon_url: Option<String>,
    pub historical: Vec<HistoricalEntry>,
    pub timestamps: Vec<i64>,
    pub pending: usize,
    pub generation: u64,
    pub map_loaded: bool,
    pub map_error: Option<String>,
    pub error: Option<String>,
    pub failures: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user picked a view mode.
    Select(WeatherType),
    /// The handler for `generation` issued `pending` fetches.
    Dispatched { generation: u64, timestamps: Vec<i64>, pending: usize },
    CurrentLoaded {
        generation: u64,
        snapshot: ForecastSnapshot,
        label: DayLabel,
        icon_url: Option<String>,
    },
    HistoricalLoaded { generation: u64, entry: HistoricalEntry },
    FetchFailed { generation: u64, reason: String },
    LocationResolved(Coordinate),
    LocationFailed(String),
    /// The post-placement timer fired.
    MarkerCheckElapsed,
    MapReady,
    MapFailed(String),
}

impl ViewState {
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::Select(weather_type) => Self {
                weather_type,
                loading: true,
                historical: Vec::new(),
                timestamps: Vec::new(),
                pending: 0,
                generation: self.generation + 1,
                error: None,
                failures: 0,
                ..self
            },

            Action::Dispatched { generation, timestamps, pending } => {
                if generation != self.generation {
                    return self;
                }
                Self { loading: pending > 0, timestamps, pending, ..self }
            }

            Action::CurrentLoaded { generation, snapshot, label, icon_url } => {
                if generation != self.generation {
                    return self;
                }
                Self {
                    forecast: Some(snapshot),
                    date_label: Some(label),
                    icon_url,
                    ..self
                }
                .complete_one()
            }

            Action::HistoricalLoaded { generation, entry } => {
                if generation != self.generation {
                    return self;
                }
                let mut historical = self.historical;
                historical.push(entry);
                Self { historical, ..self }.complete_one()
            }

            Action::FetchFailed { generation, reason } => {
                if generation != self.generation {
                    return self;
                }
                let error = self.error.or(Some(reason));
                Self { error, failures: self.failures + 1, ..self }.complete_one()
            }

            Action::LocationResolved(coordinate) => Self {
                coordinate,
                map: self.map.place_marker(coordinate),
                location_loaded: true,
                location_unavailable: coordinate.is_zero() && self.location_unavailable,
                location_error: None,
                ..self
            },

            // The coordinate stays as it was; the marker is placed at it anyway.
            Action::LocationFailed(reason) => Self {
                map: self.map.place_marker(self.coordinate),
                location_unavailable: true,
                location_error: Some(reason),
                ..self
            },

            Action::MarkerCheckElapsed => {
                if self.map.marker.position.is_zero() {
                    Self { location_unavailable: true, ..self }
                } else {
                    self
                }
            }

            Action::MapReady => Self { map_loaded: true, map_error: None, ..self },

            Action::MapFailed(reason) => {
                Self { map_loaded: false, map_error: Some(reason), ..self }
            }
        }
    }

    fn complete_one(self) -> Self {
        let pending = self.pending.saturating_sub(1);
        Self { pending, loading: pending > 0, ..self }
    }

    /// Historical entries sorted oldest first.
    pub fn historical_chronological(&self) -> Vec<HistoricalEntry> {
        let mut entries = self.historical.clone();
        entries.sort_by_key(|e| e.snapshot.dt);
        entries
    }

    /// Labels in the same (completion) order as `historical`.
    pub fn labels(&self) -> impl Iterator<Item = &DayLabel> {
        self.historical.iter().map(|e| &e.label)
    }
}

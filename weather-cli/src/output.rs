use std::fmt::Write;

use chrono::{DateTime, Local};
use weatherview_core::{ForecastSnapshot, ViewState, WeatherType, format::date_string};

fn reading(snapshot: &ForecastSnapshot) -> String {
    let mut line = String::new();
    if let Some(temp) = snapshot.temp {
        let _ = write!(line, "{temp:.1}°C");
    }
    if let Some(desc) = snapshot.description() {
        let _ = write!(line, "  {desc}");
    }
    if let Some(humidity) = snapshot.humidity {
        let _ = write!(line, "  humidity {humidity}%");
    }
    if let Some(wind) = snapshot.wind_speed {
        let _ = write!(line, "  wind {wind:.1} m/s");
    }
    line
}

fn local_time(unix: i64) -> String {
    DateTime::from_timestamp(unix, 0)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Human-readable rendering of a settled view.
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();

    if state.location_unavailable {
        let reason = state.location_error.as_deref().unwrap_or("no fix");
        let _ = writeln!(out, "Location unavailable ({reason}); showing {}", state.coordinate);
    } else {
        let _ = writeln!(out, "Location: {}", state.coordinate);
    }

    match state.weather_type {
        WeatherType::Daily => {
            if let (Some(snapshot), Some(label)) = (&state.forecast, &state.date_label) {
                let _ = writeln!(out, "{} {} {}", label.day, label.date, local_time(snapshot.dt));
                let _ = writeln!(out, "  {}", reading(snapshot));
                if let Some(icon) = &state.icon_url {
                    let _ = writeln!(out, "  icon: {icon}");
                }
            }
        }
        WeatherType::Historical => {
            let _ = writeln!(out, "Past {} days:", state.timestamps.len());
            for entry in state.historical_chronological() {
                let _ = writeln!(
                    out,
                    "  {:<9} {}  {}",
                    entry.label.day,
                    entry.label.date,
                    reading(&entry.snapshot)
                );
            }
            let missing = state.timestamps.len().saturating_sub(state.historical.len());
            if missing > 0 {
                let _ = writeln!(out, "  ({missing} day(s) could not be fetched)");
            }
        }
        WeatherType::Map => {
            let _ = writeln!(out, "Map: {}", state.map.link());
            if let Some(err) = &state.map_error {
                let _ = writeln!(out, "  map resource failed to load: {err}");
            }
        }
    }

    if let Some(err) = &state.error {
        match state.failures {
            0 | 1 => {
                let _ = writeln!(out, "Error: {err}");
            }
            n => {
                let _ = writeln!(out, "Error: {err} (and {} more failed request(s))", n - 1);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherview_core::{Action, Coordinate, DayLabel, HistoricalEntry};

    fn snapshot(dt: i64) -> ForecastSnapshot {
        serde_json::from_value(serde_json::json!({
            "dt": dt,
            "temp": 3.25,
            "humidity": 70,
            "weather": [{ "main": "Snow", "description": "light snow", "icon": "13d" }]
        }))
        .expect("valid snapshot")
    }

    #[test]
    fn historical_is_listed_oldest_first() {
        let state = ViewState::default()
            .reduce(Action::LocationResolved(Coordinate::new(60.0, 25.0)))
            .reduce(Action::Select(WeatherType::Historical));
        let generation = state.generation;
        let mut state = state.reduce(Action::Dispatched {
            generation,
            timestamps: vec![300, 200, 100],
            pending: 3,
        });
        for dt in [200, 300, 100] {
            state = state.reduce(Action::HistoricalLoaded {
                generation,
                entry: HistoricalEntry {
                    snapshot: snapshot(dt),
                    label: DayLabel { day: format!("D{dt}"), date: date_string(dt) },
                },
            });
        }

        let text = render(&state);
        let first = text.find("D100").expect("D100 listed");
        let last = text.find("D300").expect("D300 listed");
        assert!(first < last);
        assert!(text.contains("3.2°C") || text.contains("3.3°C"));
        assert!(text.contains("light snow"));
    }

    #[test]
    fn repeated_failures_show_first_reason_and_count() {
        let state = ViewState::default().reduce(Action::Select(WeatherType::Historical));
        let generation = state.generation;
        let state = state
            .reduce(Action::Dispatched { generation, timestamps: vec![3, 2, 1], pending: 3 })
            .reduce(Action::FetchFailed { generation, reason: "status 429".into() })
            .reduce(Action::FetchFailed { generation, reason: "status 500".into() });

        let text = render(&state);
        assert!(text.contains("Error: status 429 (and 1 more failed request(s))"));
    }

    #[test]
    fn recovered_location_is_not_reported_unavailable() {
        let state = ViewState::default()
            .reduce(Action::LocationFailed("denied".into()))
            .reduce(Action::LocationResolved(Coordinate::new(40.7, -74.0)));
        let text = render(&state);
        assert!(text.starts_with("Location: 40.7000, -74.0000"));
    }

    #[test]
    fn unavailable_location_is_reported() {
        let state = ViewState::default().reduce(Action::LocationFailed("timed out".into()));
        let text = render(&state);
        assert!(text.starts_with("Location unavailable (timed out)"));
    }

    #[test]
    fn map_view_prints_link() {
        let state = ViewState::default()
            .reduce(Action::LocationResolved(Coordinate::new(1.0, 2.0)))
            .reduce(Action::Select(WeatherType::Map));
        let text = render(&state);
        assert!(text.contains("openstreetmap.org/?mlat=1&mlon=2"));
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A latitude/longitude pair in decimal degrees.
///
/// The default is `{0, 0}`, which the view also uses as the "no location yet"
/// marker position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True only for exactly `{0.0, 0.0}`.
    pub fn is_zero(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One entry of the provider's `weather` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

/// A single weather reading (the `current` block of a One Call response).
///
/// Fields the app does not interpret are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    /// Observation time, Unix seconds.
    pub dt: i64,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<u8>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastSnapshot {
    /// Icon code of the first reported condition.
    pub fn icon(&self) -> Option<&str> {
        self.weather.first().map(|w| w.icon.as_str()).filter(|icon| !icon.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.weather.first().map(|w| w.description.as_str())
    }
}

/// Display label derived from a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayLabel {
    pub day: String,
    pub date: String,
}

/// One past day's reading and the label derived from its own `dt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEntry {
    pub snapshot: ForecastSnapshot,
    pub label: DayLabel,
}

/// The view mode the user selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherType {
    #[default]
    Daily,
    Historical,
    Map,
}

impl WeatherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherType::Daily => "daily",
            WeatherType::Historical => "historical",
            WeatherType::Map => "map",
        }
    }

    pub const fn all() -> &'static [WeatherType] {
        &[WeatherType::Daily, WeatherType::Historical, WeatherType::Map]
    }
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "daily" => Ok(WeatherType::Daily),
            "historical" => Ok(WeatherType::Historical),
            "map" => Ok(WeatherType::Map),
            _ => Err(anyhow::anyhow!(
                "Unknown weather type '{value}'. Supported types: daily, historical, map."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_type_as_str_roundtrip() {
        for ty in WeatherType::all() {
            let parsed: WeatherType = ty.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*ty, parsed);
        }
    }

    #[test]
    fn unknown_weather_type_error() {
        let err = "weekly".parse::<WeatherType>().unwrap_err();
        assert!(err.to_string().contains("Unknown weather type"));
    }

    #[test]
    fn zero_coordinate_is_exact() {
        assert!(Coordinate::default().is_zero());
        assert!(!Coordinate::new(0.0, 0.0001).is_zero());
    }

    #[test]
    fn snapshot_keeps_unknown_fields() {
        let json = serde_json::json!({
            "dt": 1700000000,
            "temp": 11.5,
            "pressure": 1012,
            "uvi": 0.4,
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }]
        });

        let snapshot: ForecastSnapshot = serde_json::from_value(json).expect("valid snapshot");

        assert_eq!(snapshot.dt, 1700000000);
        assert_eq!(snapshot.icon(), Some("10d"));
        assert_eq!(snapshot.description(), Some("light rain"));
        assert_eq!(snapshot.extra.get("pressure"), Some(&serde_json::json!(1012)));
        assert!(snapshot.humidity.is_none());
    }

    #[test]
    fn snapshot_without_conditions_has_no_icon() {
        let snapshot: ForecastSnapshot =
            serde_json::from_value(serde_json::json!({ "dt": 1 })).expect("valid snapshot");
        assert_eq!(snapshot.icon(), None);
    }
}

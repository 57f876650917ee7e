//! Display helpers for timestamps and weather icons.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::model::DayLabel;

const ICON_HOST: &str = "openweathermap.org";

fn to_zone<Tz: TimeZone>(unix: i64, tz: &Tz) -> DateTime<Tz> {
    // Out-of-range timestamps render as the epoch.
    DateTime::<Utc>::from_timestamp(unix, 0).unwrap_or_default().with_timezone(tz)
}

/// `DD/MM/YYYY` in the given time zone.
pub fn date_string_in<Tz>(unix: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    to_zone(unix, tz).format("%d/%m/%Y").to_string()
}

/// Full weekday name in the given time zone.
pub fn day_string_in<Tz>(unix: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    to_zone(unix, tz).format("%A").to_string()
}

/// `DD/MM/YYYY` in the local system time zone.
pub fn date_string(unix: i64) -> String {
    date_string_in(unix, &Local)
}

/// Full weekday name in the local system time zone.
pub fn day_string(unix: i64) -> String {
    day_string_in(unix, &Local)
}

pub fn day_label(unix: i64) -> DayLabel {
    DayLabel { day: day_string(unix), date: date_string(unix) }
}

/// URL of the provider's 2x icon image for an icon code.
pub fn icon_url(icon: &str) -> String {
    format!("http://{ICON_HOST}/img/wn/{icon}@2x.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn golden_values_in_utc() {
        assert_eq!(date_string_in(1_700_000_000, &Utc), "14/11/2023");
        assert_eq!(day_string_in(1_700_000_000, &Utc), "Tuesday");
    }

    #[test]
    fn golden_values_east_of_utc_roll_over() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).expect("valid offset");
        assert_eq!(date_string_in(1_700_000_000, &ist), "15/11/2023");
        assert_eq!(day_string_in(1_700_000_000, &ist), "Wednesday");
    }

    #[test]
    fn local_formatting_matches_explicit_local_zone() {
        assert_eq!(date_string(1_700_000_000), date_string_in(1_700_000_000, &Local));
        assert_eq!(day_label(1_700_000_000).day, day_string_in(1_700_000_000, &Local));
    }

    #[test]
    fn out_of_range_timestamp_falls_back_to_epoch() {
        assert_eq!(date_string_in(i64::MAX, &Utc), "01/01/1970");
    }

    #[test]
    fn icon_url_template() {
        assert_eq!(icon_url("10d"), "http://openweathermap.org/img/wn/10d@2x.png");
    }
}

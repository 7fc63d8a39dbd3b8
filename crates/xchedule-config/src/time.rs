//! Date/time resolution for event fields.
//!
//! Accepted shapes are `YYYY/mm/dd HH:MM`, with `/`, `-` or `.` as the date
//! separator, an optional `:SS`, and either a 24-hour clock or a 12-hour
//! clock suffixed with `am`/`pm`. A period is two of those joined by `~`.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::fmt;
use thiserror::Error;
use xchedule_core::{TimeSpec, Timestamp};

/// Formats tried in order; the first one that parses wins.
const FORMATS: [&str; 12] = [
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %I:%M%p",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M%p",
    "%Y.%m.%d %H:%M",
    "%Y.%m.%d %I:%M%p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %I:%M:%S%p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %I:%M:%S%p",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %I:%M:%S%p",
];

const PERIOD_SEPARATOR: char = '~';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error(
        "can't parse '{0}', valid format is YYYY/mm/dd HH:MM[:SS] ('/', '-' or '.' between date parts, optional am/pm)"
    )]
    Format(String),

    #[error("'{0}' is neither a single time nor 'time ~ time'")]
    MalformedPeriod(String),

    #[error("invalid timezone name: {0}")]
    UnknownTimezone(String),

    #[error("'{text}' does not exist in timezone {zone}")]
    NonexistentLocalTime { text: String, zone: String },
}

/// The timezone an event's wall-clock times are read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The process-local timezone.
    Local,
    /// A zone from the IANA database.
    Named(Tz),
}

impl Zone {
    /// Attach this zone to a wall-clock time. Times in a DST fold resolve to
    /// the earlier instant; times in a DST gap yield `None`.
    pub fn localize(&self, naive: &NaiveDateTime) -> Option<Timestamp> {
        match self {
            Zone::Local => earliest(Local.from_local_datetime(naive)),
            Zone::Named(tz) => earliest(tz.from_local_datetime(naive)),
        }
    }
}

fn earliest<Z: TimeZone>(result: LocalResult<DateTime<Z>>) -> Option<Timestamp> {
    result.earliest().map(|dt| dt.fixed_offset())
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str("local"),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Resolve a timezone name. A missing or blank name means the process-local
/// zone.
pub fn resolve_timezone(name: Option<&str>) -> Result<Zone, TimeError> {
    match name.map(str::trim) {
        None | Some("") => Ok(Zone::Local),
        Some(name) => name
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| TimeError::UnknownTimezone(name.to_string())),
    }
}

/// Parse a single wall-clock time in `zone`.
pub fn parse_instant(text: &str, zone: &Zone) -> Result<Timestamp, TimeError> {
    let text = text.trim();
    let naive = FORMATS
        .iter()
        .find_map(|format| {
            NaiveDateTime::parse_from_str(text, format)
                .ok()
                .filter(|naive| matches_shape(text, naive, format))
        })
        .ok_or_else(|| TimeError::Format(text.to_string()))?;

    zone.localize(&naive)
        .ok_or_else(|| TimeError::NonexistentLocalTime {
            text: text.to_string(),
            zone: zone.to_string(),
        })
}

/// chrono accepts short numeric fields and collapses whitespace, so the text
/// must also print back the same way. Only the hour may drop its leading zero.
fn matches_shape(text: &str, naive: &NaiveDateTime, format: &str) -> bool {
    let unpadded = format.replace("%H", "%-H").replace("%I", "%-I");
    [format, unpadded.as_str()]
        .iter()
        .any(|f| naive.format(f).to_string().eq_ignore_ascii_case(text))
}

/// Parse either `<time>` or `<time> ~ <time>`.
pub fn resolve_period(text: &str, zone: &Zone) -> Result<TimeSpec, TimeError> {
    let parts: Vec<&str> = text.split(PERIOD_SEPARATOR).map(str::trim).collect();

    match parts.as_slice() {
        [start] if !start.is_empty() => Ok(TimeSpec::instant(parse_instant(start, zone)?)),
        [start, end] if !start.is_empty() && !end.is_empty() => Ok(TimeSpec::period(
            parse_instant(start, zone)?,
            parse_instant(end, zone)?,
        )),
        _ => Err(TimeError::MalformedPeriod(text.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn taipei() -> Zone {
        resolve_timezone(Some("Asia/Taipei")).unwrap()
    }

    fn taipei_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        chrono_tz::Asia::Taipei
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .fixed_offset()
    }

    #[test]
    fn test_all_formats_agree() {
        let inputs = [
            "2016/01/20 22:30",
            "2016/01/20 10:30PM",
            "2016-01-20 22:30",
            "2016-01-20 10:30pm",
            "2016.01.20 22:30",
            "2016.01.20 10:30PM",
            "2016/01/20 22:30:00",
            "2016/01/20 10:30:00pm",
            "2016-01-20 22:30:00",
            "2016-01-20 10:30:00PM",
            "2016.01.20 22:30:00",
            "2016.01.20 10:30:00pm",
        ];
        let expected = taipei_at(2016, 1, 20, 22, 30);

        for input in inputs {
            assert_eq!(parse_instant(input, &taipei()).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_twelve_hour_without_leading_zero() {
        let parsed = parse_instant("2016-01-20 3:04PM", &taipei()).unwrap();
        assert_eq!(parsed, taipei_at(2016, 1, 20, 15, 4));
    }

    #[test]
    fn test_loose_shapes_are_rejected() {
        for text in [
            "2016-1-2 10:00",
            "2016-01-2010:00",
            "2016-01-20 10:0",
            "2016-01-20  10:00",
            "2016/01/20 10:00:0",
            "16-01-20 10:00",
            "2016-01-20 10:00 PM",
        ] {
            let err = parse_instant(text, &taipei()).unwrap_err();
            assert_eq!(err, TimeError::Format(text.to_string()), "{text:?}");
        }
    }

    #[test]
    fn test_twenty_four_hour_without_leading_zero() {
        let parsed = parse_instant("2016-01-20 9:05", &taipei()).unwrap();
        assert_eq!(parsed, taipei_at(2016, 1, 20, 9, 5));
        let parsed = parse_instant("2016-01-20 03:04pm", &taipei()).unwrap();
        assert_eq!(parsed, taipei_at(2016, 1, 20, 15, 4));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let parsed = parse_instant("  2016.01.19 10:00:00 ", &taipei()).unwrap();
        assert_eq!(parsed, taipei_at(2016, 1, 19, 10, 0));
    }

    #[test]
    fn test_unparseable_time_names_text() {
        let err = parse_instant("tomorrow noon", &taipei()).unwrap_err();
        assert_eq!(err, TimeError::Format("tomorrow noon".to_string()));
        assert!(err.to_string().contains("YYYY/mm/dd HH:MM"));
    }

    #[test]
    fn test_period() {
        let spec = resolve_period("2016-01-20 10:00 ~ 2016-01-21 11:03PM", &taipei()).unwrap();
        assert!(spec.is_period());
        assert_eq!(spec.start, taipei_at(2016, 1, 20, 10, 0));
        assert_eq!(spec.end, Some(taipei_at(2016, 1, 21, 23, 3)));
    }

    #[test]
    fn test_instant() {
        let spec = resolve_period("2016-01-20 10:00", &taipei()).unwrap();
        assert!(!spec.is_period());
        assert_eq!(spec.start, taipei_at(2016, 1, 20, 10, 0));
        assert_eq!(spec.end, None);
    }

    #[test]
    fn test_too_many_parts() {
        let err = resolve_period("a ~ b ~ c", &taipei()).unwrap_err();
        assert!(matches!(err, TimeError::MalformedPeriod(_)));
    }

    #[test]
    fn test_empty_sides_are_malformed() {
        for text in ["", "   ", "2016-01-20 10:00 ~", "~ 2016-01-20 10:00"] {
            let err = resolve_period(text, &taipei()).unwrap_err();
            assert!(matches!(err, TimeError::MalformedPeriod(_)), "{text:?}");
        }
    }

    #[test]
    fn test_bad_end_reports_end_text() {
        let err = resolve_period("2016-01-20 10:00 ~ later", &taipei()).unwrap_err();
        assert_eq!(err, TimeError::Format("later".to_string()));
    }

    #[test]
    fn test_timezone_resolution() {
        assert_eq!(resolve_timezone(None).unwrap(), Zone::Local);
        assert_eq!(resolve_timezone(Some("")).unwrap(), Zone::Local);
        assert_eq!(
            resolve_timezone(Some("Europe/Berlin")).unwrap(),
            Zone::Named(chrono_tz::Europe::Berlin)
        );
        assert_eq!(
            resolve_timezone(Some("Taiwan/Taipei")).unwrap_err(),
            TimeError::UnknownTimezone("Taiwan/Taipei".to_string())
        );
    }

    #[test]
    fn test_local_zone_keeps_wall_clock() {
        let parsed = parse_instant("2016-01-20 10:00", &Zone::Local).unwrap();
        let expected = NaiveDate::from_ymd_opt(2016, 1, 20)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(parsed.naive_local(), expected);
    }

    #[test]
    fn test_dst_gap_is_rejected() {
        let berlin = Zone::Named(chrono_tz::Europe::Berlin);
        let err = parse_instant("2016-03-27 02:30", &berlin).unwrap_err();
        assert!(matches!(err, TimeError::NonexistentLocalTime { .. }));
    }
}

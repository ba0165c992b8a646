use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, TimeZone, Utc};
use regex::Regex;

use crate::error::Error;

/// Wire format of the `date_time` query parameter.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const INVALID_DATE_MESSAGE: &str = "Invalid Date provided for effective-start-timestamp.";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid timestamp format for effective-start-timestamp.";

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$").expect("timestamp pattern is valid")
    })
}

/// Lower bound for the incremental endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinceTime {
    /// Already in `YYYY-MM-DD HH:MM:SS`; forwarded unchanged.
    Formatted(String),
    At(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    UnixMillis(i64),
}

impl SinceTime {
    /// Produce the `date_time` query value, rejecting malformed input.
    pub fn to_query_value(&self) -> Result<String, Error> {
        match self {
            SinceTime::Formatted(raw) => {
                if timestamp_pattern().is_match(raw) {
                    Ok(raw.clone())
                } else {
                    Err(Error::InvalidInput(INVALID_FORMAT_MESSAGE.to_owned()))
                }
            }
            SinceTime::At(at) => format_timestamp(at),
            SinceTime::UnixMillis(millis) => DateTime::<Utc>::from_timestamp_millis(*millis)
                .ok_or_else(|| Error::InvalidInput(INVALID_DATE_MESSAGE.to_owned()))
                .and_then(|at| format_timestamp(&at)),
        }
    }
}

/// Format an instant in UTC as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(at: &DateTime<Utc>) -> Result<String, Error> {
    if !(0..=9999).contains(&at.year()) {
        return Err(Error::InvalidInput(INVALID_DATE_MESSAGE.to_owned()));
    }
    Ok(at.format(TIMESTAMP_FORMAT).to_string())
}

impl From<&str> for SinceTime {
    fn from(value: &str) -> Self {
        SinceTime::Formatted(value.to_owned())
    }
}

impl From<String> for SinceTime {
    fn from(value: String) -> Self {
        SinceTime::Formatted(value)
    }
}

impl From<&String> for SinceTime {
    fn from(value: &String) -> Self {
        SinceTime::Formatted(value.clone())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for SinceTime {
    fn from(value: DateTime<Tz>) -> Self {
        SinceTime::At(value.with_timezone(&Utc))
    }
}

impl From<SystemTime> for SinceTime {
    fn from(value: SystemTime) -> Self {
        let millis = match value.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_millis()).map(|ms| -ms).unwrap_or(i64::MIN),
        };
        SinceTime::UnixMillis(millis)
    }
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

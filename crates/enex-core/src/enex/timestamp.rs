//! ENEX timestamp parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::ParseError;

/// `strftime` pattern of ENEX timestamps, e.g. `20130730T205204Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Parse an ENEX timestamp (`YYYYMMDDThhmmssZ`, always UTC).
///
/// Only the fixed-width form is accepted: no separators, no fractional
/// seconds, no offsets.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use enex_core::parse_timestamp;
///
/// let ts = parse_timestamp("20130730T205204Z")?;
/// assert_eq!(ts, Utc.with_ymd_and_hms(2013, 7, 30, 20, 52, 4).unwrap());
/// # Ok::<(), enex_core::ParseError>(())
/// ```
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let malformed = || ParseError::MalformedTimestamp {
        value: value.to_owned(),
    };

    // chrono accepts variable-width fields, so check the shape first
    if !has_fixed_shape(value.as_bytes()) {
        return Err(malformed());
    }

    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| malformed())
}

fn has_fixed_shape(bytes: &[u8]) -> bool {
    bytes.len() == 16
        && bytes[8] == b'T'
        && bytes[15] == b'Z'
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[9..15].iter().all(u8::is_ascii_digit)
}

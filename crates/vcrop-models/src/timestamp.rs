//! Timestamp parsing for the keyframe wire format.
//!
//! The focus-coordinate oracle emits timestamps as fixed-width `MM:SS.mmm`
//! strings (two-digit minutes, two-digit seconds, three-digit milliseconds).
//! Parsing is full-match only: partial matches, hour components, and
//! negative values are rejected.

/// Parse a `MM:SS.mmm` timestamp to total seconds.
///
/// # Examples
/// ```
/// use vcrop_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("00:05.500").unwrap(), 5.5);
/// assert_eq!(parse_timestamp("61:00.000").unwrap(), 3660.0);
/// assert!(parse_timestamp("5.5").is_err());
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let bytes = ts.as_bytes();

    // Exactly "MM:SS.mmm": digits at fixed positions, ':' and '.' separators.
    let well_formed = bytes.len() == 9
        && bytes[2] == b':'
        && bytes[5] == b'.'
        && [0, 1, 3, 4, 6, 7, 8]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit());

    if !well_formed {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    let digit = |i: usize| (bytes[i] - b'0') as f64;
    let minutes = digit(0) * 10.0 + digit(1);
    let seconds = digit(3) * 10.0 + digit(4);
    let millis = digit(6) * 100.0 + digit(7) * 10.0 + digit(8);

    Ok(minutes * 60.0 + seconds + millis / 1000.0)
}

/// Format seconds as `MM:SS.mmm` for log output.
///
/// Minutes saturate at 99; this is a display helper, not part of the
/// planning contract.
pub fn format_seconds(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let minutes = ((total_secs / 60.0).floor() as u64).min(99);
    let seconds = total_secs - (minutes as f64) * 60.0;
    format!("{:02}:{:06.3}", minutes, seconds)
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Input does not match the `MM:SS.mmm` pattern exactly.
    InvalidFormat(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(ts) => {
                write!(f, "Invalid timestamp format '{}'. Expected MM:SS.mmm", ts)
            }
        }
    }
}

impl std::error::Error for TimestampError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_basic() {
        assert_eq!(parse_timestamp("00:00.000").unwrap(), 0.0);
        assert_eq!(parse_timestamp("00:05.500").unwrap(), 5.5);
        assert_eq!(parse_timestamp("01:30.250").unwrap(), 90.25);
    }

    #[test]
    fn test_parse_timestamp_minutes_over_sixty() {
        // Minutes are not capped at 59; "61:00.000" is 61 minutes.
        assert_eq!(parse_timestamp("61:00.000").unwrap(), 3660.0);
        assert_eq!(parse_timestamp("99:59.999").unwrap(), 5999.999);
    }

    #[test]
    fn test_parse_timestamp_rejects_malformed() {
        for bad in [
            "", "5.5", "00:5.5", "0:05.500", "00:05.50", "00:05.5000",
            "00-05.500", "00:05:500", "-0:05.500", "00:05.500 ",
            " 00:05.500", "00:05.500x", "aa:bb.ccc",
        ] {
            assert!(
                matches!(parse_timestamp(bad), Err(TimestampError::InvalidFormat(_))),
                "expected InvalidFormat for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_timestamp_rejects_hour_component() {
        assert!(parse_timestamp("01:00:00.000").is_err());
    }

    #[test]
    fn test_format_seconds_round_trip() {
        assert_eq!(format_seconds(5.5), "00:05.500");
        assert_eq!(format_seconds(90.25), "01:30.250");
        assert_eq!(parse_timestamp(&format_seconds(3660.0)).unwrap(), 3660.0);
    }
}

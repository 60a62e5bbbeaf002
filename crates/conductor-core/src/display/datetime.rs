//! Timestamp and duration display utilities.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// A wrapper around [`Timestamp`] that formats in the system timezone.
///
/// The format follows the pattern `YYYY-MM-DD HH:MM:SS TZ`, 24-hour time,
/// zero-padded components, timezone abbreviation appended.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// A wrapper around a minute count that renders compactly.
///
/// Whole values print without a fraction (`10 min`); fractional values
/// keep one decimal (`2.5 min`).
pub struct Minutes(pub f64);

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.0 - self.0.round()).abs() < 0.05 {
            write!(f, "{} min", self.0.round() as i64)
        } else {
            write!(f, "{:.1} min", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_render_compactly() {
        assert_eq!(Minutes(10.0).to_string(), "10 min");
        assert_eq!(Minutes(2.5).to_string(), "2.5 min");
        assert_eq!(Minutes(0.0).to_string(), "0 min");
    }
}

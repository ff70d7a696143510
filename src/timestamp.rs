//! Fixed-point timestamps counted in 100 ns ticks since the Unix epoch.
//!
//! Both envelope forms keep their header times as [`Timestamp`], which travels on the
//! wire as a single signed 64-bit tick count. The whole `i64` range maps onto a chrono
//! [`DateTime<Utc>`], so decoding never fails; encoding an arbitrary `DateTime` checks
//! the bounds explicitly and truncates anything finer than one tick.

use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{Error, Result};

/// Number of ticks in one second (one tick is 100 ns).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

const TICKS_PER_MICROSECOND: i64 = 10;
const NANOS_PER_TICK: i64 = 100;

/// Converts a `DateTime` into ticks since 1970-01-01T00:00:00Z.
///
/// Precision below one tick is truncated toward the past.
///
/// # Errors
///
/// Returns [`Error::TimestampOutOfRange`] when the instant doesn't fit into `i64` ticks
/// (roughly before year -27258 or after year 31197).
pub fn encode_ticks(datetime: DateTime<Utc>) -> Result<i64> {
    let ticks = i128::from(datetime.timestamp()) * i128::from(TICKS_PER_SECOND)
        + i128::from(datetime.timestamp_subsec_nanos()) / i128::from(NANOS_PER_TICK);
    i64::try_from(ticks).map_err(|_| Error::TimestampOutOfRange(datetime.to_rfc3339()))
}

/// Converts ticks since 1970-01-01T00:00:00Z back into a `DateTime`.
pub fn decode_ticks(ticks: i64) -> DateTime<Utc> {
    let micros = TimeDelta::microseconds(ticks.div_euclid(TICKS_PER_MICROSECOND));
    let nanos = TimeDelta::nanoseconds(ticks.rem_euclid(TICKS_PER_MICROSECOND) * NANOS_PER_TICK);
    DateTime::<Utc>::UNIX_EPOCH + micros + nanos
}

/// A UTC instant with 100 ns resolution.
///
/// Displays as `yyyy-MM-dd HH:mm:ss.fffffff`. Years outside 0000..=9999 (reachable near
/// [`Timestamp::MIN`] and [`Timestamp::MAX`]) get a sign and more digits, e.g.
/// `+31197-09-14 02:48:05.4775807`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// 1970-01-01T00:00:00Z.
    pub const EPOCH: Timestamp = Timestamp(0);
    pub const MIN: Timestamp = Timestamp(i64::MIN);
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Ticks since the Unix epoch, as written to the wire.
    pub const fn ticks(&self) -> i64 {
        self.0
    }

    /// Checked conversion from a chrono `DateTime`. See [`encode_ticks`].
    pub fn from_datetime(datetime: DateTime<Utc>) -> Result<Self> {
        encode_ticks(datetime).map(Self)
    }

    /// Like [`Timestamp::from_datetime`] but clamps out-of-range instants to
    /// [`Timestamp::MIN`] or [`Timestamp::MAX`].
    pub fn saturating_from_datetime(datetime: DateTime<Utc>) -> Self {
        encode_ticks(datetime).map_or_else(
            |_| {
                if datetime < DateTime::<Utc>::UNIX_EPOCH {
                    Self::MIN
                } else {
                    Self::MAX
                }
            },
            Self,
        )
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        decode_ticks(self.0)
    }

    /// Tick-of-second, i.e. the seven fractional digits.
    fn subsec_ticks(&self) -> i64 {
        self.0.rem_euclid(TICKS_PER_SECOND)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:07}",
            self.to_datetime().format("%Y-%m-%d %H:%M:%S"),
            self.subsec_ticks()
        )
    }
}

/// Parses RFC 3339, e.g. `2023-06-15T10:30:00.1234567Z`.
impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let datetime = DateTime::parse_from_rfc3339(s)
            .map_err(|_| Error::InvalidTimestamp(s.to_string()))?;
        Self::from_datetime(datetime.with_timezone(&Utc))
    }
}

impl TryFrom<DateTime<Utc>> for Timestamp {
    type Error = Error;

    fn try_from(datetime: DateTime<Utc>) -> Result<Self> {
        Self::from_datetime(datetime)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.to_datetime()
    }
}

/// RFC 3339 for years 0000 to 9999, the raw tick count otherwise.
#[cfg(feature = "serde")]
impl serde::Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use chrono::Datelike;

        let datetime = self.to_datetime();
        if !(0..=9999).contains(&datetime.year()) {
            return serializer.serialize_i64(self.0);
        }
        let rfc3339 = format!(
            "{}.{:07}Z",
            datetime.format("%Y-%m-%dT%H:%M:%S"),
            self.subsec_ticks()
        );
        serializer.serialize_str(&rfc3339)
    }
}

/// Accepts an RFC 3339 string or a tick count.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

#[cfg(feature = "serde")]
struct TimestampVisitor;

#[cfg(feature = "serde")]
impl serde::de::Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an RFC 3339 timestamp or a count of 100 ns ticks since the Unix epoch")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Timestamp, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Timestamp, E> {
        Ok(Timestamp(v))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Timestamp, E> {
        i64::try_from(v)
            .map(Timestamp)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Unsigned(v), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn epoch_is_zero_ticks() {
        assert_eq!(encode_ticks(DateTime::<Utc>::UNIX_EPOCH).unwrap(), 0);
        assert_eq!(decode_ticks(0), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(Timestamp::EPOCH.to_datetime(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn sub_second_instant_round_trips() {
        let ts: Timestamp = "2023-06-15T10:30:00.1234567Z".parse().unwrap();
        let datetime = ts.to_datetime();
        assert_eq!(datetime.timestamp_subsec_nanos(), 123_456_700);
        assert_eq!(encode_ticks(datetime).unwrap(), ts.ticks());
        assert_eq!(decode_ticks(ts.ticks()), datetime);
    }

    #[test]
    fn tick_extremes_round_trip() {
        for ticks in [i64::MAX, i64::MIN, -1, 1] {
            assert_eq!(encode_ticks(decode_ticks(ticks)).unwrap(), ticks);
        }
    }

    #[test]
    fn sub_tick_precision_is_truncated() {
        let datetime = Utc.timestamp_opt(1, 123_456_789).single().unwrap();
        assert_eq!(encode_ticks(datetime).unwrap(), 11_234_567);

        let before_epoch = Utc.timestamp_opt(-1, 99).single().unwrap();
        assert_eq!(encode_ticks(before_epoch).unwrap(), -TICKS_PER_SECOND);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let far_future = Utc.with_ymd_and_hms(40_000, 1, 1, 0, 0, 0).single().unwrap();
        assert!(matches!(
            encode_ticks(far_future),
            Err(Error::TimestampOutOfRange(_))
        ));
        assert_eq!(Timestamp::saturating_from_datetime(far_future), Timestamp::MAX);

        let far_past = Utc.with_ymd_and_hms(-40_000, 1, 1, 0, 0, 0).single().unwrap();
        assert_eq!(Timestamp::saturating_from_datetime(far_past), Timestamp::MIN);
    }

    #[test]
    fn display_has_seven_fraction_digits() {
        let ts: Timestamp = "2023-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(ts.to_string(), "2023-01-01 00:00:00.0000000");

        let ts: Timestamp = "2023-06-15T10:30:00.1234567Z".parse().unwrap();
        assert_eq!(ts.to_string(), "2023-06-15 10:30:00.1234567");

        assert_eq!(Timestamp::from_ticks(-1).to_string(), "1969-12-31 23:59:59.9999999");
    }

    #[test]
    fn display_signs_extended_years() {
        assert_eq!(Timestamp::MAX.to_string(), "+31197-09-14 02:48:05.4775807");
        assert_eq!(Timestamp::MIN.to_string(), "-27258-04-20 21:11:54.5224192");
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let ts: Timestamp = "2023-01-01T02:00:00+02:00".parse().unwrap();
        assert_eq!(ts.to_string(), "2023-01-01 00:00:00.0000000");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            "yesterday".parse::<Timestamp>(),
            Err(Error::InvalidTimestamp(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_rfc3339() {
        let ts: Timestamp = "2023-06-15T10:30:00.1234567Z".parse().unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2023-06-15T10:30:00.1234567Z\"");
        let restored: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ts);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trips_the_whole_tick_range() {
        for ts in [Timestamp::MIN, Timestamp::EPOCH, Timestamp::MAX] {
            let json = serde_json::to_string(&ts).unwrap();
            let restored: Timestamp = serde_json::from_str(&json).unwrap();
            assert_eq!(restored, ts, "{json}");
        }
        assert_eq!(serde_json::to_string(&Timestamp::MAX).unwrap(), i64::MAX.to_string());
        assert_eq!(serde_json::to_string(&Timestamp::EPOCH).unwrap(), "\"1970-01-01T00:00:00.0000000Z\"");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_ticks_beyond_i64() {
        let result = serde_json::from_str::<Timestamp>(&u64::MAX.to_string());
        assert!(result.is_err());
    }
}

//! Time and timestamp helpers.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp used for logging and day boundaries.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Nanoseconds since the Unix epoch, as carried in readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixNanos(pub i64);

impl UnixNanos {
    /// Convert a UTC timestamp, saturating outside of the representable range
    /// (years 1677 to 2262).
    #[must_use]
    pub fn from_timestamp(ts: Timestamp) -> Self {
        let nanos = ts.timestamp_nanos_opt().unwrap_or_else(|| {
            if ts.timestamp() < 0 {
                i64::MIN
            } else {
                i64::MAX
            }
        });
        Self(nanos)
    }

    /// Raw nanosecond count.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

/// Stamping clock whose successive stamps never go backwards.
///
/// The wall clock can step backwards (NTP adjustments); in that case the
/// previous stamp is repeated until the wall clock catches up.
#[derive(Debug, Default)]
pub struct Clock {
    last: AtomicI64,
}

impl Clock {
    /// Create a clock with no stamp issued yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the current wall-clock time.
    pub fn stamp(&self) -> UnixNanos {
        self.stamp_at(now())
    }

    fn stamp_at(&self, ts: Timestamp) -> UnixNanos {
        let wall = UnixNanos::from_timestamp(ts).0;
        let previous = self.last.fetch_max(wall, Ordering::AcqRel);
        UnixNanos(previous.max(wall))
    }
}

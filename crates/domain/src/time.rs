//! Timestamps for trigger bookkeeping.

use chrono::{DateTime, Utc};

/// UTC timestamp recorded when a trigger last fired.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

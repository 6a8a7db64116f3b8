//! Monotonic wall-clock timestamps
//!
//! Rows in the append-only tables are ordered by `created_at`, so two rows
//! written in the same clock tick must still get distinct, increasing
//! timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

static LAST_NANOS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current UTC time, strictly later than any value previously returned
pub(crate) fn now() -> DateTime<Utc> {
    let candidate = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX - 1);
    let mut last = LAST_NANOS.load(Ordering::Acquire);
    loop {
        let next = candidate.max(last.saturating_add(1));
        match LAST_NANOS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => return DateTime::from_timestamp_nanos(next),
            Err(actual) => last = actual,
        }
    }
}

//! History query window, expressed in whole days before "now".

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// Maximum lookback the history store accepts (about seven years).
pub const MAX_LOOKBACK_DAYS: i64 = 7 * 365;

/// A validated `[now - earlier_days, now - later_days]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryWindow {
    earlier_days: i64,
    later_days: i64,
}

impl HistoryWindow {
    /// Validate a window.
    ///
    /// Both bounds must be positive and `earlier_days` must exceed
    /// `later_days`. An `earlier_days` past [`MAX_LOOKBACK_DAYS`] is clamped
    /// down with a warning; the ordering check applies after clamping.
    pub fn new(earlier_days: i64, later_days: i64) -> ConfigResult<Self> {
        if earlier_days <= 0 || later_days <= 0 {
            return Err(ConfigError::NonPositiveWindow {
                earlier_days,
                later_days,
            });
        }
        if earlier_days <= later_days {
            return Err(ConfigError::MisorderedWindow {
                earlier_days,
                later_days,
            });
        }

        let clamped = earlier_days.min(MAX_LOOKBACK_DAYS);
        if clamped != earlier_days {
            warn!(
                requested = earlier_days,
                clamped,
                "history window exceeds provider lookback, clamping"
            );
        }
        if clamped <= later_days {
            return Err(ConfigError::MisorderedWindow {
                earlier_days: clamped,
                later_days,
            });
        }

        Ok(Self {
            earlier_days: clamped,
            later_days,
        })
    }

    pub fn earlier_days(&self) -> i64 {
        self.earlier_days
    }

    pub fn later_days(&self) -> i64 {
        self.later_days
    }

    /// Absolute `(start, end)` bounds relative to `now`. Start strictly
    /// precedes end.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            now - Duration::days(self.earlier_days),
            now - Duration::days(self.later_days),
        )
    }
}

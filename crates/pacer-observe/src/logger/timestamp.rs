//! Timezone handling and RFC3339 timestamp formatting for log output.

use std::{
    fmt,
    str::FromStr,
    sync::{OnceLock, RwLock},
};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing::debug;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::logger::LoggerError;

/// Global cache for the local UTC offset.
///
/// Updated by `init_local_offset()` on startup and `sync_local_offset()`
/// periodically when the `timezone-sync` feature is active.
static LOCAL_OFFSET: RwLock<UtcOffset> = RwLock::new(UtcOffset::UTC);

/// Tracks whether local offset initialization has been attempted.
static INIT_DONE: OnceLock<()> = OnceLock::new();

/// Timezone configuration for log timestamps.
///
/// - `Utc`: all timestamps in UTC (always works, default)
/// - `Local`: uses the system timezone
#[derive(Default, Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LoggerTimeZone {
    /// UTC timezone.
    #[default]
    Utc,
    /// Local system timezone.
    Local,
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        };
        f.write_str(s)
    }
}

/// Initializes the local timezone offset early in the program.
///
/// **CRITICAL**: call in `main()` **before spawning any threads** (before the
/// tokio runtime). Timezone detection fails in multi-thread contexts on most
/// Unix platforms. Falls back to UTC silently if detection fails.
pub fn init_local_offset() {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    if let Ok(mut guard) = LOCAL_OFFSET.write() {
        *guard = offset;
    }
    let _ = INIT_DONE.set(());
}

/// Re-detects the local offset, updating the cache on change.
///
/// Detection quietly no-ops in multi-thread contexts where the platform
/// refuses to answer; the cached value stays in effect.
pub(crate) fn sync_local_offset() {
    let Ok(new_offset) = UtcOffset::current_local_offset() else {
        debug!("timezone sync skipped (multi-thread context)");
        return;
    };

    let Ok(mut guard) = LOCAL_OFFSET.write() else {
        return;
    };
    if *guard != new_offset {
        debug!(
            "TZ offset updated: {} -> {}",
            format_offset(*guard),
            format_offset(new_offset)
        );
        *guard = new_offset;
    }
}

/// Returns the current local offset for timestamp formatting.
pub(crate) fn get_or_detect_local_offset() -> UtcOffset {
    INIT_DONE.get_or_init(|| match UtcOffset::current_local_offset() {
        Ok(detected) => {
            if let Ok(mut guard) = LOCAL_OFFSET.write() {
                *guard = detected;
            }
        }
        Err(_) => {
            eprintln!(
                "WARNING: pacer-observe local timezone detection failed. \
                 Call init_local_offset() in main() before the tokio runtime. \
                 Falling back to UTC."
            );
        }
    });

    LOCAL_OFFSET.read().map(|guard| *guard).unwrap_or(UtcOffset::UTC)
}

/// Formats an offset as `UTC±HH` or `UTC±HH:MM`.
fn format_offset(offset: UtcOffset) -> String {
    let hours = offset.whole_hours();
    let minutes = offset.minutes_past_hour();
    if minutes == 0 {
        format!("UTC{:+03}", hours)
    } else {
        format!("UTC{:+03}:{:02}", hours, minutes.abs())
    }
}

/// RFC3339 timestamp formatter honoring the configured timezone.
///
/// For [`LoggerTimeZone::Local`] the current cached offset is read on every
/// invocation, so timezone changes are reflected without subscriber
/// reinitialization. Falls back to UTC if formatting fails.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoggerRfc3339 {
    tz: LoggerTimeZone,
}

impl LoggerRfc3339 {
    pub(crate) fn new(tz: LoggerTimeZone) -> Self {
        Self { tz }
    }
}

impl FormatTime for LoggerRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = match self.tz {
            LoggerTimeZone::Utc => OffsetDateTime::now_utc(),
            LoggerTimeZone::Local => {
                OffsetDateTime::now_utc().to_offset(get_or_detect_local_offset())
            }
        };

        match now.format(&Rfc3339) {
            Ok(ts) => write!(w, "{} ", ts),
            Err(_) => write!(w, "<invalid-time> "),
        }
    }
}

/// Periodically re-syncs the cached local offset to pick up DST transitions
/// without a process restart.
///
/// Spawn this from the daemon next to the controller; it exits when `cancel`
/// fires.
#[cfg(feature = "timezone-sync")]
pub async fn sync_local_offset_periodically(
    period: std::time::Duration,
    cancel: tokio_util::sync::CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so the startup offset stands.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => sync_local_offset(),
            _ = cancel.cancelled() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{LoggerTimeZone, format_offset};
    use time::UtcOffset;

    #[test]
    fn default_is_utc() {
        assert_eq!(LoggerTimeZone::default(), LoggerTimeZone::Utc);
    }

    #[test]
    fn parses_case_insensitive() {
        assert_eq!(LoggerTimeZone::from_str("UTC").unwrap(), LoggerTimeZone::Utc);
        assert_eq!(
            LoggerTimeZone::from_str("Local").unwrap(),
            LoggerTimeZone::Local
        );
    }

    #[test]
    fn rejects_invalid_timezone() {
        assert!(LoggerTimeZone::from_str("").is_err());
        assert!(LoggerTimeZone::from_str("pst").is_err());
    }

    #[test]
    fn display_returns_canonical_names() {
        assert_eq!(LoggerTimeZone::Utc.to_string(), "utc");
        assert_eq!(LoggerTimeZone::Local.to_string(), "local");
    }

    #[test]
    fn format_offset_handles_utc_and_halves() {
        assert_eq!(format_offset(UtcOffset::UTC), "UTC+00");
        assert_eq!(
            format_offset(UtcOffset::from_hms(3, 30, 0).unwrap()),
            "UTC+03:30"
        );
        assert_eq!(format_offset(UtcOffset::from_hms(-5, 0, 0).unwrap()), "UTC-05");
    }
}

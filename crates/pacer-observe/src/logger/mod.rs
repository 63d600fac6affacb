mod config;
mod error;
mod format;
mod init;
mod level;
mod timestamp;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;
pub use level::LoggerLevel;
pub use timestamp::{LoggerTimeZone, init_local_offset};

#[cfg(feature = "timezone-sync")]
pub use timestamp::sync_local_offset_periodically;

/// Initializes the global tracing subscriber with the given configuration.
///
/// Once initialized, all `tracing` macros (`info!`, `debug!`, etc.) route
/// through this configuration. Initializing twice returns
/// [`LoggerError::AlreadyInitialized`].
///
/// # Important: Local Timezone
/// For [`LoggerTimeZone::Local`], call [`init_local_offset`] in `main()`
/// before spawning any threads (before the async runtime starts); offset
/// detection fails in multi-threaded contexts on most Unix platforms.
///
/// # Examples
/// ```rust
/// use pacer_observe::{LoggerConfig, init_logger};
///
/// fn main() {
///     let config = LoggerConfig::default();
///     init_logger(&config).expect("failed to initialize logger");
///
///     tracing::info!("logger initialized");
/// }
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => init::logger_text(cfg),
        LoggerFormat::Json => init::logger_json(cfg),
        LoggerFormat::Journald => init::logger_journald(cfg),
    }
}

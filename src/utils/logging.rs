use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "FORMGUARD_LOG_FORMAT";

/// Log output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text format with timestamp, level, target, and message
    #[default]
    Text,
    /// JSON format with structured fields: timestamp, level, target, message
    Json,
}

impl LogFormat {
    /// Parses a format name, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use formguard::utils::logging::LogFormat;
    ///
    /// assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
    /// assert_eq!(LogFormat::parse("xml"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "text" => Some(LogFormat::Text),
            _ => None,
        }
    }
}

/// Installs the global tracing subscriber and bridges `log` records into it.
///
/// The output format is `config.log_format` and the filter comes from
/// `RUST_LOG` (default `info`). Calling this more than once is harmless:
/// later calls leave the first subscriber in place and return `Ok`.
///
/// # Examples
///
/// ```ignore
/// use formguard::{init_logging, EngineConfig};
///
/// let config = EngineConfig::from_env()?;
/// init_logging(&config)?;
/// log::info!("form engine ready");
/// ```
pub fn init_logging(config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_log::LogTracer;
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (text_layer, json_layer) = match config.log_format {
        LogFormat::Text => (Some(fmt::layer().with_target(true)), None),
        LogFormat::Json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            ),
        ),
    };

    // Initialize LogTracer bridge first (idempotent - errors are ignored)
    let _ = LogTracer::init();

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .try_init();

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            log::debug!("Tracing subscriber already initialized: {}", e);
            Ok(())
        }
    }
}

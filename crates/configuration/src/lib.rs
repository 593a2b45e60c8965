use crate::error::ConfigError;
pub use crate::settings::Config;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisSettings, LoggingSettings, ServerSettings, SourceSettings};

/// Prefix for environment overrides, e.g. `DEALSCOPE__ANALYSIS__INITIAL_EQUITY=5000`.
pub const ENV_PREFIX: &str = "DEALSCOPE";

/// Loads the application configuration.
///
/// Reads the optional TOML file at `path`, layers `DEALSCOPE__*` environment
/// variables on top, deserializes into our strongly-typed `Config` and validates it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Checks the settings every command relies on.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.analysis.initial_equity <= rust_decimal::Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "analysis.initial_equity must be greater than 0".to_string(),
        ));
    }
    if config.source.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "source.timeout_secs must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Checks the settings only the HTTP dispatcher needs.
pub fn validate_server(config: &Config) -> Result<(), ConfigError> {
    if config.server.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "server.api_key must be set to serve the analysis endpoint".to_string(),
        ));
    }
    if config.server.addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "server.addr '{}' is not a valid socket address",
            config.server.addr
        )));
    }
    Ok(())
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. When a log directory is
/// configured a daily rolling file is added; the returned guard must be kept
/// alive for the lifetime of the program so buffered lines get flushed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    let console = fmt::layer().with_target(false);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "dealscope.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            Ok(None)
        }
    }
}

use config::{Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::{init_logging, LogLevel};
pub use settings::{Configuration, RunSettings, SUPPORTED_VERSION};
pub use validation::validate;

/// Prefix for environment variables that override document settings,
/// e.g. `SQLEXEC_RUN__CONTINUE_ON_ERROR=true`.
pub const ENV_PREFIX: &str = "SQLEXEC";

/// Loads and validates an action document from a YAML file.
///
/// This function is the primary entry point for this crate. It reads the file,
/// layers `SQLEXEC_`-prefixed environment overrides on top, deserializes the
/// result into our strongly-typed `Configuration` and validates its structure.
pub fn load_configuration(path: impl AsRef<Path>) -> Result<Configuration, ConfigError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let builder = config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml))
        .add_source(environment());

    finish(builder)
}

/// Same as [`load_configuration`] for an in-memory YAML document.
pub fn load_configuration_str(document: &str) -> Result<Configuration, ConfigError> {
    load_str_with(document, environment())
}

fn load_str_with(document: &str, environment: Environment) -> Result<Configuration, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from_str(document, FileFormat::Yaml))
        .add_source(environment);

    finish(builder)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Configuration, ConfigError> {
    let configuration = builder.build()?.try_deserialize::<Configuration>()?;
    validate(&configuration)?;

    tracing::debug!(
        connections = configuration.connections.len(),
        actions = configuration.actions.len(),
        "Configuration loaded."
    );
    Ok(configuration)
}

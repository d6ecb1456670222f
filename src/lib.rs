//! Omnivalue - self-describing values for object IPC runtimes
//!
//! One [`Value`] type carries scalars, object references and nested
//! key/value maps across process boundaries. Maps are combined with a small
//! algebra (join, overlay, inherit, retain, remove) and travel in a compact
//! binary archive format.
//!
//! The engine lives in `omnivalue-core`; this crate re-exports it and wires
//! up process-level setup.
#![warn(missing_docs)]

pub use omnivalue_core::core::config::load_config;
pub use omnivalue_core::types::{compare, lexical_compare, InlineData, Items};
pub use omnivalue_core::{
    global_config, install_config, load_config_or_default, map_pool, ArchiveError, ArchiveReader,
    ArchiveWriter, ByteSink, ByteSource, ConfigError, Error, FlatObject, LocalObject, MapEntry,
    MapStore, MergeFlags, ObjectRef, RemoteObject, Result, SharedBuffer, StatusCode, TypeCode,
    Value, ValueConfig,
};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Process setup failures
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// A global tracing subscriber is already installed
    #[error("tracing subscriber already installed: {0}")]
    Subscriber(String),

    /// The configuration could not be loaded or installed
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Install the tracing subscriber, filtered by `RUST_LOG`
pub fn init() -> std::result::Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| InitError::Subscriber(e.to_string()))?;

    tracing::info!("Initializing {} v{}", NAME, VERSION);
    Ok(())
}

/// [`init`], then load the TOML configuration at `path` and install it as
/// the process-wide settings.
///
/// Must run before the first value is built: the map pool pins whatever
/// configuration it sees first.
pub fn init_with_config(path: &str) -> std::result::Result<(), InitError> {
    init()?;
    let config = load_config(path)?;
    install_config(config)?;
    tracing::info!("Installed value configuration from {}", path);
    Ok(())
}

#[cfg(test)]
mod tests;

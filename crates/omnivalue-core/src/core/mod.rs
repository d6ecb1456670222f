//! Cross-cutting concerns: logging and configuration

/// Process-wide configuration
pub mod config;

/// Logging macros
pub mod logging;

// Re-export commonly used items
pub use config::{global_config, install_config, load_config, load_config_or_default, ValueConfig};

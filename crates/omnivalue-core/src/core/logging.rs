//! Logging utilities
//!
//! Thin macros over the tracing crate so call sites stay short and the
//! backend can change in one place.

/// Logging macros with a clean API
pub mod logging {

    /// Info level logging - general information messages
    #[macro_export]
    macro_rules! log_info {
        ($($arg:tt)*) => {{
            tracing::info!($($arg)*);
        }};
    }

    /// Warning level logging - potentially problematic situations
    #[macro_export]
    macro_rules! log_warn {
        ($($arg:tt)*) => {{
            tracing::warn!($($arg)*);
        }};
    }

    /// Error level logging - error conditions
    #[macro_export]
    macro_rules! log_error {
        ($($arg:tt)*) => {{
            tracing::error!($($arg)*);
        }};
    }

    /// Debug level logging - detailed information for debugging
    #[macro_export]
    macro_rules! log_debug {
        ($($arg:tt)*) => {{
            tracing::debug!($($arg)*);
        }};
    }

    /// Trace level logging - compiled in only with the `debug-logging` feature
    #[macro_export]
    macro_rules! log_trace {
        ($($arg:tt)*) => {{
            #[cfg(feature = "debug-logging")]
            tracing::trace!($($arg)*);
        }};
    }
}

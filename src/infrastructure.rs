// Infrastructure layer modules
pub mod config;
pub mod logging;

// Re-exports
pub use config::{DEFAULT_TIMEZONE, DispatcherConfig};
pub use logging::{ZonedTimer, init_logging};

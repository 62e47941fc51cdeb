// Domain layer modules
pub mod event_source;
pub mod response;

// Re-exports
pub use event_source::{EventSource, is_truthy};
pub use response::Response;

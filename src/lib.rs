// Telehub - Actor-based Device Telemetry Registry
// Hierarchical device tracking built with Rust + Kameo

pub mod actors;
pub mod config;
pub mod messages;
pub mod types;

// Re-exports for convenience
pub use messages::*;
pub use types::*;

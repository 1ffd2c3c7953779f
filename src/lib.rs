// Node stack modules, leaf first
pub mod bus; // Register access layer
pub mod console; // Diagnostic console driver
pub mod controller; // CAN controller driver
pub mod auth; // Authenticated frame builder
pub mod node; // Main loop / scheduler

// Re-exports for convenience
pub use auth::FrameAuthenticator;
pub use controller::{CanController, ControllerMode};
pub use node::{BeaconConfig, BeaconNode};

// Common types and traits
pub mod error;
pub mod types;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

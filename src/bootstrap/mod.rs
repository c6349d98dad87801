//! Process bootstrap: config loading, tracing setup and dependency wiring.

pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, ConfigOverrides};
pub use wiring::{wire_services, AppServices};

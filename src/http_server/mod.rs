//! # Gear HTTP Server Module
//!
//! Process bootstrap for the catalog service: configuration, logging,
//! store connection and the Axum server.

pub mod config;
pub mod errors;
pub mod server;

pub use config::GearConfig;
pub use errors::{BootError, BootResult};
pub use server::{init_tracing, run, GearServer};

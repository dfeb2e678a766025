//! gear-crud - CRUD catalog service for tabletop armor and weapons
//!
//! Layers, leaves first:
//! - `model`: record shapes and the identifier type
//! - `store`: query builder and the `GearStore` implementations
//! - `rest_api`: handlers, router, response and error helpers
//! - `http_server`: configuration and process bootstrap

pub mod http_server;
pub mod model;
pub mod rest_api;
pub mod store;

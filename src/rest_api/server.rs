//! # REST API Router
//!
//! Route table for the gear catalog and the state shared by every
//! handler.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use super::handler;
use crate::store::GearStore;

/// Version reported by `/ping` and `/health`
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// State shared by all gear handlers
#[derive(Clone)]
pub struct GearService {
    pub version: String,
    pub database: Arc<dyn GearStore>,
}

impl GearService {
    pub fn new(database: Arc<dyn GearStore>) -> Self {
        Self::with_version(database, API_VERSION)
    }

    pub fn with_version(database: Arc<dyn GearStore>, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            database,
        }
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        Router::new()
            .route("/ping", get(handler::ping_check))
            .route("/health", get(handler::health_check))
            .route(
                "/armor",
                get(handler::get_armor).post(handler::insert_armor),
            )
            .route(
                "/armor/:id",
                get(handler::get_armor_by_id)
                    .put(handler::update_armor_by_id)
                    .delete(handler::delete_armor_by_id),
            )
            .route(
                "/weapon",
                get(handler::get_weapon).post(handler::insert_weapon),
            )
            .route(
                "/weapon/:id",
                get(handler::get_weapon_by_id)
                    .put(handler::update_weapon_by_id)
                    .delete(handler::delete_weapon_by_id),
            )
            .with_state(self)
    }
}

//! # Gear REST API
//!
//! HTTP surface for the armor and weapon collections:
//!
//! - `GET /ping`, `GET /health`
//! - `POST|GET /armor`, `GET|PUT|DELETE /armor/:id`
//! - `POST|GET /weapon`, `GET|PUT|DELETE /weapon/:id`

pub mod errors;
pub mod handler;
pub mod response;
pub mod server;

pub use errors::{classify, RestError, RestResult};
pub use response::{respond_no_content, respond_with_error, respond_with_json, ErrorResponse};
pub use server::{GearService, API_VERSION};

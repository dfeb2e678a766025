//! # Request Handlers
//!
//! Each handler parses its inputs, delegates to the gear store and maps
//! the outcome to a response. Handlers hold no records between requests.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use super::errors::{RestError, RestResult};
use super::response::{respond_no_content, respond_with_json};
use super::server::GearService;
use crate::model::{Armor, GearId, GearRecord, HealthCheckResponse, Weapon};
use crate::store::QueryParams;

/// Error message for a body that does not decode
pub const INVALID_PAYLOAD: &str = "Invalid Request Payload";

/// Body of a successful `/health` check
pub const HEALTHY_MESSAGE: &str = "Gear Database Healthy";

/// Parse a path identifier
///
/// Failures surface as a store validation error, not a 400.
fn parse_path_id(raw: &str) -> RestResult<GearId> {
    GearId::parse(raw).map_err(|e| RestError::Store(e.into()))
}

/// Decode a record body; any failure is a 400 with a fixed message
fn decode_body<R: DeserializeOwned>(body: &[u8]) -> RestResult<R> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "rejecting request body");
        RestError::InvalidBody(INVALID_PAYLOAD.to_string())
    })
}

/// Confirmation for a newly inserted record, with its location
fn inserted<R: GearRecord>(record: &R, message: &str) -> Response {
    let location = format!("/{}/{}", R::KIND, record.id());
    let mut response = respond_with_json(StatusCode::OK, message);
    if let Ok(value) = location.parse::<HeaderValue>() {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}

/// Process liveness only; never touches the store
pub async fn ping_check(State(service): State<GearService>) -> Response {
    (StatusCode::OK, format!("OK, {}", service.version)).into_response()
}

/// Store reachability
pub async fn health_check(State(service): State<GearService>) -> Response {
    match service.database.ping().await {
        Ok(()) => respond_with_json(StatusCode::OK, HEALTHY_MESSAGE),
        Err(err) => {
            error!(error = %err, "health check failed");
            respond_with_json(
                StatusCode::FAILED_DEPENDENCY,
                HealthCheckResponse {
                    api_version: service.version.clone(),
                    db_error: err.to_string(),
                },
            )
        }
    }
}

pub async fn insert_armor(
    State(service): State<GearService>,
    uri: Uri,
    body: Bytes,
) -> RestResult<Response> {
    info!(%uri, "InsertArmor invoked");

    let mut armor: Armor = decode_body(&body)?;
    armor.id = GearId::new();

    service.database.insert_armor(&armor).await?;

    Ok(inserted(&armor, "Armor Object Created"))
}

pub async fn get_armor(
    State(service): State<GearService>,
    uri: Uri,
    Query(params): Query<QueryParams>,
) -> RestResult<Response> {
    info!(%uri, "GetArmor invoked");

    let armor = service.database.get_armor(&params).await?;
    Ok(respond_with_json(StatusCode::OK, armor))
}

pub async fn get_armor_by_id(
    State(service): State<GearService>,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> RestResult<Response> {
    info!(%uri, "GetArmorByID invoked");

    let id = parse_path_id(&raw_id)?;
    let armor = service.database.get_armor_by_id(id).await?;
    Ok(respond_with_json(StatusCode::OK, armor))
}

pub async fn update_armor_by_id(
    State(service): State<GearService>,
    uri: Uri,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> RestResult<Response> {
    info!(%uri, "UpdateArmorByID invoked");

    let id = parse_path_id(&raw_id)?;
    let armor: Armor = decode_body(&body)?;

    service.database.update_armor_by_id(armor, id).await?;
    Ok(respond_with_json(StatusCode::OK, id))
}

/// Store failures are logged, never reported; the response is always 204
pub async fn delete_armor_by_id(
    State(service): State<GearService>,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> RestResult<Response> {
    info!(%uri, "DeleteArmorByID invoked");

    let id = parse_path_id(&raw_id)?;
    if let Err(err) = service.database.delete_armor_by_id(id).await {
        error!(%id, error = %err, "armor delete failed");
    }

    Ok(respond_no_content(StatusCode::NO_CONTENT))
}

pub async fn insert_weapon(
    State(service): State<GearService>,
    uri: Uri,
    body: Bytes,
) -> RestResult<Response> {
    info!(%uri, "InsertWeapon invoked");

    let mut weapon: Weapon = decode_body(&body)?;
    weapon.id = GearId::new();

    service.database.insert_weapon(&weapon).await?;

    Ok(inserted(&weapon, "Weapon Object Created"))
}

pub async fn get_weapon(
    State(service): State<GearService>,
    uri: Uri,
    Query(params): Query<QueryParams>,
) -> RestResult<Response> {
    info!(%uri, "GetWeapon invoked");

    let weapons = service.database.get_weapon(&params).await?;
    Ok(respond_with_json(StatusCode::OK, weapons))
}

pub async fn get_weapon_by_id(
    State(service): State<GearService>,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> RestResult<Response> {
    info!(%uri, "GetWeaponByID invoked");

    let id = parse_path_id(&raw_id)?;
    let weapon = service.database.get_weapon_by_id(id).await?;
    Ok(respond_with_json(StatusCode::OK, weapon))
}

pub async fn update_weapon_by_id(
    State(service): State<GearService>,
    uri: Uri,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> RestResult<Response> {
    info!(%uri, "UpdateWeaponByID invoked");

    let id = parse_path_id(&raw_id)?;
    let weapon: Weapon = decode_body(&body)?;

    service.database.update_weapon_by_id(weapon, id).await?;
    Ok(respond_with_json(StatusCode::OK, id))
}

/// Store failures are logged, never reported; the response is always 204
pub async fn delete_weapon_by_id(
    State(service): State<GearService>,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> RestResult<Response> {
    info!(%uri, "DeleteWeaponByID invoked");

    let id = parse_path_id(&raw_id)?;
    if let Err(err) = service.database.delete_weapon_by_id(id).await {
        error!(%id, error = %err, "weapon delete failed");
    }

    Ok(respond_no_content(StatusCode::NO_CONTENT))
}

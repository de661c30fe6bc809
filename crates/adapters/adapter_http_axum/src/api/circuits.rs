//! JSON handlers for exposed circuits.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use unibridge_domain::circuit::CircuitView;

use crate::board::BoardEntry;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `PUT /api/circuits/{alias}`.
#[derive(Debug, Default, Deserialize)]
pub struct SetRequest {
    pub on: Option<bool>,
    /// Brightness `0..=100`, analog outputs only.
    pub level: Option<f64>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<BoardEntry>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the single-circuit endpoints.
pub enum CircuitResponse {
    Ok(Json<BoardEntry>),
}

impl IntoResponse for CircuitResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Only exposed circuits are reachable over HTTP.
fn exposed(state: &AppState, alias: &str) -> Result<(), ApiError> {
    if state.board.contains(alias) {
        Ok(())
    } else {
        Err(ApiError::NotExposed(alias.to_string()))
    }
}

fn respond(state: &AppState, view: CircuitView) -> Result<CircuitResponse, ApiError> {
    let entry = state
        .board
        .get(view.alias.as_str())
        .ok_or_else(|| ApiError::NotExposed(view.alias.to_string()))?;
    Ok(CircuitResponse::Ok(Json(BoardEntry { view, ..entry })))
}

/// `GET /api/circuits`
pub async fn list(State(state): State<AppState>) -> ListResponse {
    ListResponse::Ok(Json(state.board.list()))
}

/// `GET /api/circuits/{alias}`: relays and digital outputs are read back
/// from the controller first.
pub async fn get(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<CircuitResponse, ApiError> {
    exposed(&state, &alias)?;
    let view = state.handle.read(&alias).await?;
    respond(&state, view)
}

/// `PUT /api/circuits/{alias}`: the on/off flag is applied before the level,
/// so switching on from zero does not override the requested level.
pub async fn set(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<CircuitResponse, ApiError> {
    exposed(&state, &alias)?;
    if req.level.is_some_and(|level| !(0.0..=100.0).contains(&level)) {
        return Err(ApiError::BadRequest("level must be within 0..=100"));
    }
    let mut view = None;
    if let Some(on) = req.on {
        view = Some(state.handle.set_on(&alias, on).await?);
    }
    if let Some(level) = req.level {
        view = Some(state.handle.set_level(&alias, level).await?);
    }
    let view = view.ok_or(ApiError::BadRequest("expected `on` or `level`"))?;
    respond(&state, view)
}

/// `POST /api/circuits/{alias}/identify`
pub async fn identify(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<CircuitResponse, ApiError> {
    exposed(&state, &alias)?;
    let view = state.handle.identify(&alias).await?;
    respond(&state, view)
}

//! Single-user registration.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use rollcall_core::{RegisteredUser, RegistrationRequest};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// `POST /api/registerUser`
///
/// Registers one user into this process's store. Rule violations come back
/// as `400 {"error": "<message>"}`.
#[tracing::instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    request: std::result::Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Json<RegisteredUser>> {
    let Json(request) = request.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let user = state.registration().register(request)?;

    Ok(Json(user))
}

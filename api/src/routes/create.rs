//! The create doctor route.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use db::DoctorDraft;
use tracing::{info, instrument};

use crate::{
    AppState,
    error::{AppError, MessageResponse, Result},
};

/// Add a doctor to the directory
///
/// All four fields are required. A doctor whose details exactly match an
/// existing record is rejected.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body(content = DoctorDraft, description = "The doctor's details"),
    responses(
        (status = 201, description = "Doctor added successfully", body = MessageResponse),
        (status = 400, description = "A field is missing or invalid, or the doctor already exists", body = MessageResponse),
        (status = 500, description = "The doctor could not be stored", body = MessageResponse),
    )
)]
#[instrument(skip(store, payload))]
#[axum::debug_handler]
pub async fn create_doctor(
    State(AppState { store, .. }): State<AppState>,
    payload: Result<Json<DoctorDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(draft) = payload?;
    let doctor = draft.validate()?;

    let created = store
        .insert(doctor)
        .await
        .map_err(|err| AppError::from_store(err, "Failed to add doctor."))?;

    info!(id = %created.id, "doctor added");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Doctor added successfully.")),
    ))
}

//! HTTP handlers for the registration API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::RegistrationError;
use crate::messages;
use crate::models::{RegistrationCounts, ScreenshotAttachment};
use crate::wizard::{FieldId, Wizard};

use super::server::AppState;

/// Error wrapper mapping the registration taxonomy onto HTTP responses.
pub struct ApiError(RegistrationError);

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RegistrationError::InvalidField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RegistrationError::FieldConflict { .. } | RegistrationError::SubmissionInFlight => {
                StatusCode::CONFLICT
            }
            RegistrationError::VerificationFailed { .. } => StatusCode::BAD_REQUEST,
            RegistrationError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            RegistrationError::EmailDispatch { .. }
            | RegistrationError::UploadFailed { .. }
            | RegistrationError::StoreRequest { .. }
            | RegistrationError::StoreRejected { .. }
            | RegistrationError::InsertNotConfirmed { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        // Unexpected store failures get the generic try-again wording with
        // the raw diagnostic attached; everything else names its field
        let message = match &self.0 {
            RegistrationError::StoreRequest { .. }
            | RegistrationError::StoreRejected { .. }
            | RegistrationError::InsertNotConfirmed { .. } => {
                messages::registration_store_failure(&self.0.to_string())
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "field": self.0.field(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

fn wizard_of(state: &AppState, id: Uuid) -> ApiResult<Arc<Wizard>> {
    state
        .wizards
        .get(id)
        .ok_or_else(|| ApiError(RegistrationError::SessionNotFound { id: id.to_string() }))
}

/// Best-effort client address: first forwarded hop, else the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "HackVibe Registration Server Running"
}

/// GET /api/counts - team and participant counters
pub async fn counts(State(state): State<AppState>) -> ApiResult<Json<RegistrationCounts>> {
    let teams = state.store.count().await?;
    Ok(Json(RegistrationCounts::from_teams(teams)))
}

/// POST /api/wizard - open a fresh wizard session
pub async fn open_wizard(State(state): State<AppState>) -> impl IntoResponse {
    let wizard = state.wizards.open();
    (
        StatusCode::CREATED,
        Json(json!({ "session_id": wizard.id() })),
    )
}

/// DELETE /api/wizard/{id} - tear the session down
pub async fn close_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    state.wizards.close(id);
    StatusCode::NO_CONTENT
}

/// GET /api/wizard/{id} - current wizard state
pub async fn snapshot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let wizard = wizard_of(&state, id)?;
    Ok(Json(wizard.snapshot().await).into_response())
}

#[derive(Deserialize)]
pub struct SetFieldRequest {
    pub field: String,
    pub value: String,
}

/// POST /api/wizard/{id}/field - store one field edit
pub async fn set_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetFieldRequest>,
) -> ApiResult<Response> {
    let wizard = wizard_of(&state, id)?;
    let field = FieldId::parse(&request.field).ok_or_else(|| {
        ApiError(RegistrationError::InvalidField {
            field: request.field.clone(),
            message: "Unknown field".to_string(),
        })
    })?;
    wizard.set_field(field, &request.value).await?;
    Ok(Json(wizard.snapshot().await).into_response())
}

/// POST /api/wizard/{id}/next
pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let wizard = wizard_of(&state, id)?;
    wizard.advance().await?;
    Ok(Json(wizard.snapshot().await).into_response())
}

/// POST /api/wizard/{id}/previous
pub async fn previous_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let wizard = wizard_of(&state, id)?;
    wizard.retreat().await?;
    Ok(Json(wizard.snapshot().await).into_response())
}

#[derive(Deserialize)]
pub struct OtpSendRequest {
    pub email: String,
}

/// POST /api/wizard/{id}/otp/send - dispatch a verification code
pub async fn otp_send(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OtpSendRequest>,
) -> ApiResult<Response> {
    let wizard = wizard_of(&state, id)?;
    wizard.send_otp(request.email.trim()).await?;
    Ok(Json(wizard.snapshot().await).into_response())
}

#[derive(Deserialize)]
pub struct OtpVerifyRequest {
    pub code: String,
}

/// POST /api/wizard/{id}/otp/verify - check the entered code
pub async fn otp_verify(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OtpVerifyRequest>,
) -> ApiResult<Response> {
    let wizard = wizard_of(&state, id)?;
    wizard.verify_otp(&request.code).await?;
    Ok(Json(wizard.snapshot().await).into_response())
}

/// POST /api/wizard/{id}/screenshot - attach the payment screenshot
pub async fn attach_screenshot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let wizard = wizard_of(&state, id)?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError(RegistrationError::InvalidField {
            field: "payment_screenshot".to_string(),
            message: e.to_string(),
        })
    })? {
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().unwrap_or("screenshot.png").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| {
            ApiError(RegistrationError::InvalidField {
                field: "payment_screenshot".to_string(),
                message: e.to_string(),
            })
        })?;

        wizard
            .attach_screenshot(ScreenshotAttachment {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            })
            .await?;
        return Ok(Json(wizard.snapshot().await).into_response());
    }

    Err(ApiError(RegistrationError::InvalidField {
        field: "payment_screenshot".to_string(),
        message: "No file found in the upload".to_string(),
    }))
}

/// POST /api/wizard/{id}/submit - run the submission orchestrator
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let wizard = wizard_of(&state, id)?;
    let ip = client_ip(&headers, peer);

    let record = wizard.submit(&ip).await?;
    let registration_id = record.id.unwrap_or_default();
    info!(
        "Team '{}' registered with id {}",
        record.team_name, registration_id
    );

    Ok(Json(json!({
        "message": messages::registration_success(registration_id),
        "registration": record,
    }))
    .into_response())
}

/// GET /api/wizard/{id}/receipt - downloadable HTML receipt
pub async fn receipt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Html<String>> {
    let wizard = wizard_of(&state, id)?;
    Ok(Html(wizard.receipt_html().await))
}

//! HTTP request handlers for the tour endpoints.

use axum::{
    extract::{multipart::MultipartRejection, FromRequestParts, Multipart, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use bytes::Bytes;
use tracing::{debug, info};

use super::auth::Authenticated;
use super::dto::{CreatedResponse, HealthResponse, MessageResponse, TourListQuery};
use super::error::AppError;
use super::state::AppState;
use crate::controller::TourForm;
use crate::tour::{Tour, TourFilter};
use crate::uploads::UploadedImage;

/// Multipart part carrying the tour picture.
pub const IMAGE_FIELD: &str = "image";

// Numeric `{id}` path segment; anything else is a JSON 400
#[derive(Debug, Clone, Copy)]
pub struct TourId(pub u64);

impl<S> FromRequestParts<S> for TourId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<u64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(TourId(id))
    }
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List tours matching the query filters.
pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<TourListQuery>,
) -> Result<Json<Vec<Tour>>, AppError> {
    let filter = TourFilter::try_from(query)?;
    let tours = state.controller.list(&filter).await?;
    debug!(count = tours.len(), "listed tours");
    Ok(Json(tours))
}

/// Get a single tour.
pub async fn get_tour(
    State(state): State<AppState>,
    TourId(id): TourId,
) -> Result<Json<Tour>, AppError> {
    Ok(Json(state.controller.get(id).await?))
}

pub async fn create_tour(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let form = read_form(multipart).await?;
    let tour = state.controller.create(form).await?;
    info!(id = tour.id, user = %claims.sub, "tour created via api");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: tour.id,
            message: "Tour created successfully".to_string(),
        }),
    ))
}

pub async fn update_tour(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    TourId(id): TourId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let form = read_form(multipart).await?;
    state.controller.update(id, form).await?;
    info!(id, user = %claims.sub, "tour updated via api");

    Ok(Json(MessageResponse::new("Tour updated successfully")))
}

pub async fn delete_tour(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    TourId(id): TourId,
) -> Result<Json<MessageResponse>, AppError> {
    state.controller.remove(id).await?;
    info!(id, user = %claims.sub, "tour deleted via api");

    Ok(Json(MessageResponse::new("Tour deleted successfully")))
}

// Text parts become form fields; the `image` part with a file name becomes the upload
async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<TourForm, AppError> {
    let mut multipart = multipart?;
    let mut form = TourForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field.content_type().map(str::to_string);
                let data: Bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked
                if !data.is_empty() {
                    form.image = Some(UploadedImage {
                        file_name,
                        content_type,
                        data,
                    });
                }
                continue;
            }
        }

        let value = field.text().await?;
        form.fields.insert(name, value);
    }

    Ok(form)
}

//! `/api/images` endpoints

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::models::{Record, RecordPatch};
use crate::services::classifier_client::IMAGE_FIELD;
use crate::AppState;

/// POST /api/images/upload
///
/// Multipart body with the image in field `image`. Other fields are ignored.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Record>> {
    let mut multipart = multipart?;
    let mut upload: Option<(String, Vec<u8>)> = None;

    // Over-limit bodies surface here as 413, other read failures as 400
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field '{}'", IMAGE_FIELD))
    })?;

    debug!(filename = %filename, bytes = bytes.len(), "Upload request");

    let record = state.images.upload(&bytes, &filename).await?;
    Ok(Json(record))
}

/// GET /api/images
pub async fn list_images(State(state): State<AppState>) -> ApiResult<Json<Vec<Record>>> {
    Ok(Json(state.images.get_all().await?))
}

/// GET /api/images/:id
pub async fn get_image(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Record>> {
    let Path(id) = id?;
    Ok(Json(state.images.get_by_id(&id).await?))
}

/// PUT /api/images/:id
///
/// Partial record; empty strings and zero numbers leave the stored value as is.
pub async fn update_image(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    patch: Result<Json<RecordPatch>, JsonRejection>,
) -> ApiResult<Json<Record>> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    Ok(Json(state.images.update_metadata(&id, patch).await?))
}

/// DELETE /api/images/:id
pub async fn delete_image(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<&'static str> {
    let Path(id) = id?;
    state.images.delete_by_id(&id).await?;
    Ok("Image Deleted")
}

/// DELETE /api/images
pub async fn delete_all_images(State(state): State<AppState>) -> ApiResult<&'static str> {
    state.images.delete_all().await?;
    Ok("All Images Deleted")
}

/// Build image routes; upload bodies are capped at `max_upload_bytes`
pub fn image_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/images", get(list_images).delete(delete_all_images))
        .route(
            "/api/images/upload",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/images/:id",
            get(get_image).put(update_image).delete(delete_image),
        )
}

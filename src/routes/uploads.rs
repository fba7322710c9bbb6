use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, post},
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_image))
        .route("/{filename}", delete(delete_image))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub image_url: String,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<UploadResponse>),
        (status = 400, description = "No file in the request"),
    ),
    security(("bearer_auth" = [])),
    tag = "Uploads"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UploadResponse>>)> {
    ensure_admin(&user)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let image_url = state.files.save(&filename, &bytes).await?;
        return Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(
                "Image uploaded",
                UploadResponse { image_url },
            )),
        ));
    }

    Err(AppError::BadRequest("No file was uploaded".into()))
}

#[utoipa::path(
    delete,
    path = "/api/upload/{filename}",
    params(("filename" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "Image deleted"),
        (status = 404, description = "File not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Uploads"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(filename): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    ensure_admin(&user)?;
    if !state.files.delete(&filename).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(ApiResponse::success(
        "Image deleted",
        serde_json::json!({}),
    )))
}

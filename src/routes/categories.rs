use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};

use crate::{
    dto::categories::{CategoryList, CategoryPayload},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::ApiResponse,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/", post(create_category))
        .route("/{id}", put(update_category))
        .route("/{id}", delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>),
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let items = category_service::list_categories(&state).await?;
    Ok(Json(ApiResponse::success(
        "Categories",
        CategoryList { items },
    )))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Category created", body = ApiResponse<Category>),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CategoryPayload>,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_admin(&user)?;
    let category = category_service::create_category(&state, payload.name).await?;
    Ok(Json(ApiResponse::success(
        "Category created",
        category,
    )))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryPayload>,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_admin(&user)?;
    let category = category_service::update_category(&state, id, payload.name).await?;
    Ok(Json(ApiResponse::success(
        "Category updated",
        category,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_admin(&user)?;
    let category = category_service::delete_category(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Category deleted",
        category,
    )))
}

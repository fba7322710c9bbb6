use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use serde_json::Value;

use crate::{
    dto::menu::{CreateMenuItemRequest, MenuItemDetail, MenuItemList, UpdateMenuItemRequest},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::MenuItem,
    response::ApiResponse,
    routes::params::MenuQuery,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu_items))
        .route("/", post(create_menu_item))
        .route("/paginated", get(list_menu_items_paginated))
        .route("/{id}", get(get_menu_item))
        .route("/{id}", put(update_menu_item))
        .route("/{id}", delete(delete_menu_item))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    responses(
        (status = 200, description = "Full menu", body = ApiResponse<MenuItemList>),
    ),
    tag = "Menu"
)]
pub async fn list_menu_items(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let items = menu_service::list_menu_items(&state).await?;
    Ok(Json(ApiResponse::success(
        "Menu",
        MenuItemList { items },
    )))
}

#[utoipa::path(
    get,
    path = "/api/menu/paginated",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("category_id" = Option<i64>, Query, description = "Filter by category"),
    ),
    responses(
        (status = 200, description = "Paginated menu", body = ApiResponse<Vec<MenuItemDetail>>),
    ),
    tag = "Menu"
)]
pub async fn list_menu_items_paginated(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuItemDetail>>>> {
    let resp = menu_service::list_menu_items_paginated(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/{id}",
    params(("id" = i64, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<MenuItemDetail>),
        (status = 404, description = "Menu item not found"),
    ),
    tag = "Menu"
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<MenuItemDetail>>> {
    let item = menu_service::get_menu_item(&state, id).await?;
    Ok(Json(ApiResponse::success("Menu item", item)))
}

#[utoipa::path(
    post,
    path = "/api/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item created", body = ApiResponse<MenuItem>),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    ensure_admin(&user)?;
    let item = menu_service::create_menu_item(&state, payload).await?;
    Ok(Json(ApiResponse::success(
        "Menu item created",
        item,
    )))
}

#[utoipa::path(
    put,
    path = "/api/menu/{id}",
    params(("id" = i64, Path, description = "Menu item ID")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    ensure_admin(&user)?;
    let item = menu_service::update_menu_item(&state, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Menu item updated",
        item,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/menu/{id}",
    params(("id" = i64, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Menu item deleted"),
        (status = 400, description = "Menu item is referenced by orders"),
        (status = 404, description = "Menu item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Value>>> {
    ensure_admin(&user)?;
    menu_service::delete_menu_item(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Menu item deleted",
        serde_json::json!({}),
    )))
}

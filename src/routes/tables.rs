use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::{NaiveDate, NaiveTime};

use crate::{
    dto::tables::{
        CreateTableRequest, TableAvailabilityList, TableList, TableWindowAvailabilityList,
        UpdateTableRequest, UpdateTableStatusRequest, WindowQuery,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::DiningTable,
    response::ApiResponse,
    services::table_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables))
        .route("/", post(create_table))
        .route("/availability", get(tables_with_availability))
        .route("/availability/date-time", get(tables_availability_for_window))
        .route("/id/{id}", get(get_table))
        // The public QR lookup shares the dynamic segment with the admin
        // mutations; the GET side reads it as an opaque token.
        .route(
            "/{id}",
            get(get_table_by_token).put(update_table).delete(delete_table),
        )
        .route("/{id}/status", patch(update_table_status))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    responses(
        (status = 200, description = "List tables", body = ApiResponse<TableList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TableList>>> {
    ensure_admin(&user)?;
    let items = table_service::list_tables(&state.pool).await?;
    Ok(Json(ApiResponse::success(
        "Tables",
        TableList { items },
    )))
}

#[utoipa::path(
    get,
    path = "/api/tables/availability",
    responses(
        (status = 200, description = "Current availability of every table",
         body = ApiResponse<TableAvailabilityList>),
    ),
    tag = "Tables"
)]
pub async fn tables_with_availability(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<TableAvailabilityList>>> {
    let items = table_service::tables_with_availability(&state.pool).await?;
    Ok(Json(ApiResponse::success(
        "Table availability",
        TableAvailabilityList { items },
    )))
}

#[utoipa::path(
    get,
    path = "/api/tables/availability/date-time",
    params(
        ("date" = String, Query, description = "Date, YYYY-MM-DD"),
        ("time" = String, Query, description = "Time, HH:mm"),
    ),
    responses(
        (status = 200, description = "Availability for the requested window",
         body = ApiResponse<TableWindowAvailabilityList>),
        (status = 400, description = "Missing or malformed date/time"),
    ),
    tag = "Tables"
)]
pub async fn tables_availability_for_window(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> AppResult<Json<ApiResponse<TableWindowAvailabilityList>>> {
    let (Some(date), Some(time)) = (query.date, query.time) else {
        return Err(AppError::BadRequest("Both date and time are required".into()));
    };
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Invalid date, expected YYYY-MM-DD".into()))?;
    let time = NaiveTime::parse_from_str(&time, "%H:%M")
        .map_err(|_| AppError::BadRequest("Invalid time, expected HH:mm".into()))?;
    let start_at = date.and_time(time).and_utc();

    let items = table_service::tables_availability_for_window(&state.pool, start_at).await?;
    Ok(Json(ApiResponse::success(
        "Table availability",
        TableWindowAvailabilityList { items },
    )))
}

#[utoipa::path(
    get,
    path = "/api/tables/id/{id}",
    params(("id" = i64, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Table", body = ApiResponse<DiningTable>),
        (status = 404, description = "Table not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn get_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    ensure_admin(&user)?;
    let table = table_service::get_table(&state.pool, id).await?;
    Ok(Json(ApiResponse::success("Table", table)))
}

#[utoipa::path(
    get,
    path = "/api/tables/{token}",
    params(("token" = String, Path, description = "Table QR token")),
    responses(
        (status = 200, description = "Table behind the QR token", body = ApiResponse<DiningTable>),
        (status = 404, description = "Table not found"),
    ),
    tag = "Tables"
)]
pub async fn get_table_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = table_service::get_table_by_token(&state.pool, &token).await?;
    Ok(Json(ApiResponse::success("Table", table)))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 200, description = "Table created", body = ApiResponse<DiningTable>),
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    ensure_admin(&user)?;
    let table = table_service::create_table(&state.pool, payload).await?;
    Ok(Json(ApiResponse::success(
        "Table created",
        table,
    )))
}

#[utoipa::path(
    put,
    path = "/api/tables/{id}",
    params(("id" = i64, Path, description = "Table ID")),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Table updated", body = ApiResponse<DiningTable>),
        (status = 404, description = "Table not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn update_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    ensure_admin(&user)?;
    let table = table_service::update_table(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Table updated",
        table,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}/status",
    params(("id" = i64, Path, description = "Table ID")),
    request_body = UpdateTableStatusRequest,
    responses(
        (status = 200, description = "Occupied flag updated", body = ApiResponse<DiningTable>),
        (status = 404, description = "Table not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn update_table_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTableStatusRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    ensure_admin(&user)?;
    let table = table_service::update_table_status(&state.pool, id, payload.is_occupied).await?;
    Ok(Json(ApiResponse::success(
        "Table status updated",
        table,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}",
    params(("id" = i64, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Table deleted", body = ApiResponse<DiningTable>),
        (status = 400, description = "Table has active orders or reservations"),
        (status = 404, description = "Table not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn delete_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    ensure_admin(&user)?;
    let table = table_service::delete_table(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(
        "Table deleted",
        table,
    )))
}

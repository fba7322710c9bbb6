use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};

use crate::{
    dto::reservations::{
        CreateReservationRequest, ReservationDetail, ReservationList, UpdateReservationRequest,
        UpdateReservationStatusRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Reservation,
    response::ApiResponse,
    services::{availability, reservation_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reservations))
        .route("/", post(create_reservation))
        .route("/{id}", get(get_reservation))
        .route("/{id}", put(update_reservation))
        .route("/{id}/status", patch(update_reservation_status))
        .route("/{id}", delete(delete_reservation))
}

#[utoipa::path(
    get,
    path = "/api/reservations",
    responses(
        (status = 200, description = "List reservations", body = ApiResponse<ReservationList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Reservations"
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ReservationList>>> {
    ensure_admin(&user)?;
    let items = reservation_service::list_reservations(&state.pool).await?;
    Ok(Json(ApiResponse::success(
        "Reservations",
        ReservationList { items },
    )))
}

#[utoipa::path(
    get,
    path = "/api/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation", body = ApiResponse<ReservationDetail>),
        (status = 404, description = "Reservation not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reservations"
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ReservationDetail>>> {
    ensure_admin(&user)?;
    let reservation = reservation_service::get_reservation(&state.pool, id).await?;
    Ok(Json(ApiResponse::success("Reservation", reservation)))
}

#[utoipa::path(
    post,
    path = "/api/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<Reservation>),
        (status = 400, description = "Window conflict or active-order block"),
        (status = 404, description = "Table not found"),
    ),
    tag = "Reservations"
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reservation>>)> {
    let reservation = availability::create_reservation(&state.pool, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Reservation created",
            reservation,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation ID")),
    request_body = UpdateReservationRequest,
    responses(
        (status = 200, description = "Reservation updated", body = ApiResponse<Reservation>),
        (status = 400, description = "Window conflict or active-order block"),
        (status = 404, description = "Reservation or table not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reservations"
)]
pub async fn update_reservation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateReservationRequest>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    ensure_admin(&user)?;
    let reservation = availability::update_reservation(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Reservation updated",
        reservation,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/reservations/{id}/status",
    params(("id" = i64, Path, description = "Reservation ID")),
    request_body = UpdateReservationStatusRequest,
    responses(
        (status = 200, description = "Reservation status updated", body = ApiResponse<Reservation>),
        (status = 404, description = "Reservation not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reservations"
)]
pub async fn update_reservation_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateReservationStatusRequest>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    ensure_admin(&user)?;
    let reservation =
        reservation_service::update_reservation_status(&state.pool, id, payload.status).await?;
    Ok(Json(ApiResponse::success(
        "Reservation status updated",
        reservation,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation deleted", body = ApiResponse<Reservation>),
        (status = 400, description = "Reservation has associated orders"),
        (status = 404, description = "Reservation not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reservations"
)]
pub async fn delete_reservation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    ensure_admin(&user)?;
    let reservation = reservation_service::delete_reservation(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(
        "Reservation deleted",
        reservation,
    )))
}

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post, put},
};
use serde::Serialize;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CreateOrderRequest, CreateOrderResponse, OrderList, OrderWithItems,
        UpdateOrderStatusRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    routes::params::Pagination,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/", post(create_order))
        .route("/stream", get(stream_orders))
        .route("/{id}", put(update_order_status))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Orders per page, default 20"),
    ),
    responses(
        (status = 200, description = "Orders with their items, newest first",
         body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    ensure_admin(&user)?;
    let resp = order_service::list_orders(&state.pool, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<CreateOrderResponse>),
        (status = 400, description = "Empty or invalid item list"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreateOrderResponse>>)> {
    let resp = order_service::create_order(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    ensure_admin(&user)?;
    let resp = order_service::update_order_status(&state.pool, id, payload.status).await?;
    Ok(Json(resp))
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent<'a> {
    Connected { client_id: Uuid },
    NewOrder { orders: &'a [OrderWithItems] },
}

fn sse_event<T: Serialize>(payload: &T) -> Event {
    match serde_json::to_string(payload) {
        Ok(json) => Event::default().data(json),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize stream event");
            Event::default().comment("serialization error")
        }
    }
}

/// Long-lived SSE subscription to newly created orders. The client first
/// receives a `connected` acknowledgement, then one `new_order` event per
/// poll tick that found data. Dropping the connection drops the broadcast
/// receiver, which is all the deregistration there is.
#[utoipa::path(
    get,
    path = "/api/orders/stream",
    responses(
        (status = 200, description = "Server-sent event stream of new orders"),
    ),
    tag = "Orders"
)]
pub async fn stream_orders(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (client_id, rx) = state.notifier.subscribe();
    tracing::info!(
        %client_id,
        subscribers = state.notifier.subscriber_count(),
        "order stream client connected"
    );

    let connected = tokio_stream::once(Ok(sse_event(&StreamEvent::Connected { client_id })));
    let updates = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(batch) => Some(Ok(sse_event(&StreamEvent::NewOrder { orders: &batch }))),
        Err(err) => {
            // Lagged receiver: those batches are gone, the store still has them.
            tracing::warn!(%client_id, error = %err, "order stream client lagged");
            None
        }
    });

    Sse::new(connected.chain(updates)).keep_alive(KeepAlive::default())
}

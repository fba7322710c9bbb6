use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod doc;
pub mod health;
pub mod menu;
pub mod orders;
pub mod params;
pub mod reservations;
pub mod tables;
pub mod uploads;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/menu", menu::router())
        .nest("/tables", tables::router())
        .nest("/reservations", reservations::router())
        .nest("/orders", orders::router())
        .nest("/upload", uploads::router())
}

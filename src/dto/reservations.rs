use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub table_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReservationRequest {
    pub table_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReservationStatusRequest {
    pub status: String,
}

/// Reservation joined with its table name for admin listings.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct ReservationDetail {
    pub id: i64,
    pub table_id: i64,
    pub table_name: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationList {
    pub items: Vec<ReservationDetail>,
}

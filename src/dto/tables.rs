use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::DiningTable;
use crate::services::availability::AvailabilityReason;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub name: String,
    pub seats: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTableRequest {
    pub name: String,
    pub seats: i32,
    pub is_occupied: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTableStatusRequest {
    pub is_occupied: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableList {
    pub items: Vec<DiningTable>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WindowQuery {
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Availability derived from the occupied flag and current open activity.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableAvailability {
    pub id: i64,
    pub name: String,
    pub seats: i32,
    pub is_occupied: bool,
    pub active_orders_count: i64,
    pub active_reservations_count: i64,
    pub is_available: bool,
    pub availability_reason: AvailabilityReason,
}

/// Availability scoped to a proposed two-hour reservation window.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableWindowAvailability {
    pub id: i64,
    pub name: String,
    pub seats: i32,
    pub conflicting_reservations_count: i64,
    pub active_orders_count: i64,
    pub is_available: bool,
    pub availability_reason: AvailabilityReason,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableAvailabilityList {
    pub items: Vec<TableAvailability>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableWindowAvailabilityList {
    pub items: Vec<TableWindowAvailability>,
}

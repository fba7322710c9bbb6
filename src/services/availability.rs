use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    dto::reservations::{CreateReservationRequest, UpdateReservationRequest},
    error::{AppError, AppResult},
    models::{RESERVATION_STATUSES, Reservation},
};

/// Minimum gap between an open order's creation and a reservation start on
/// the same table. Also the implicit duration of a reservation window when
/// only a start instant is given.
pub const ORDER_BLOCK_HOURS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityReason {
    Occupied,
    ActiveOrders,
    Reserved,
    Available,
}

/// Half-open interval intersection: touching endpoints do not conflict.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    !(b_end <= a_start || b_start >= a_end)
}

/// An open order blocks a reservation when it was created within the two
/// hours before the reservation starts, and not on an earlier calendar day.
pub fn blocks_reservation(order_created_at: DateTime<Utc>, start_at: DateTime<Utc>) -> bool {
    order_created_at >= start_at - Duration::hours(ORDER_BLOCK_HOURS)
        && order_created_at.date_naive() >= start_at.date_naive()
}

/// Reason precedence when no window is given: occupied flag wins, then open
/// orders, then active reservations.
pub fn occupancy_reason(
    is_occupied: bool,
    active_orders: i64,
    active_reservations: i64,
) -> AvailabilityReason {
    if is_occupied {
        AvailabilityReason::Occupied
    } else if active_orders > 0 {
        AvailabilityReason::ActiveOrders
    } else if active_reservations > 0 {
        AvailabilityReason::Reserved
    } else {
        AvailabilityReason::Available
    }
}

/// Reason precedence for a concrete window: a conflicting reservation wins
/// over an order inside the block interval.
pub fn window_reason(conflicting_reservations: i64, active_orders: i64) -> AvailabilityReason {
    if conflicting_reservations > 0 {
        AvailabilityReason::Reserved
    } else if active_orders > 0 {
        AvailabilityReason::ActiveOrders
    } else {
        AvailabilityReason::Available
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReservationWindow {
    id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
}

/// True when another active reservation on the table overlaps the proposed
/// window. `exclude` lets updates ignore the reservation being edited.
pub async fn has_reservation_conflict(
    pool: &DbPool,
    table_id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    exclude: Option<i64>,
) -> AppResult<bool> {
    let windows: Vec<ReservationWindow> = sqlx::query_as(
        "SELECT id, start_at, end_at FROM reservations
         WHERE table_id = $1 AND status IN ('pending', 'confirmed')",
    )
    .bind(table_id)
    .fetch_all(pool)
    .await?;

    Ok(windows
        .iter()
        .filter(|w| Some(w.id) != exclude)
        .any(|w| overlaps(start_at, end_at, w.start_at, w.end_at)))
}

/// True when the table carries a non-terminal order recent enough to still
/// occupy it when the reservation begins.
pub async fn has_active_order_block(
    pool: &DbPool,
    table_id: i64,
    start_at: DateTime<Utc>,
) -> AppResult<bool> {
    let created: Vec<(DateTime<Utc>,)> = sqlx::query_as(
        "SELECT created_at FROM orders
         WHERE table_id = $1 AND status NOT IN ('completed', 'cancelled')",
    )
    .bind(table_id)
    .fetch_all(pool)
    .await?;

    Ok(created
        .iter()
        .any(|(created_at,)| blocks_reservation(*created_at, start_at)))
}

async fn table_exists(pool: &DbPool, table_id: i64) -> AppResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM tables WHERE id = $1")
        .bind(table_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Validation pipeline, in order: table existence, window sanity, overlap
/// against other active reservations, active-order block. All checks are
/// advisory; concurrent creations on the same window are not serialized.
async fn validate_window(
    pool: &DbPool,
    table_id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    exclude: Option<i64>,
) -> AppResult<()> {
    if !table_exists(pool, table_id).await? {
        return Err(AppError::NotFound);
    }
    if end_at <= start_at {
        return Err(AppError::BadRequest(
            "Reservation end must be after its start".into(),
        ));
    }
    if has_reservation_conflict(pool, table_id, start_at, end_at, exclude).await? {
        return Err(AppError::BadRequest(
            "Table is already reserved for this time".into(),
        ));
    }
    if has_active_order_block(pool, table_id, start_at).await? {
        return Err(AppError::BadRequest(
            "Table has active orders for this time".into(),
        ));
    }
    Ok(())
}

pub async fn create_reservation(
    pool: &DbPool,
    payload: CreateReservationRequest,
) -> AppResult<Reservation> {
    validate_window(pool, payload.table_id, payload.start_at, payload.end_at, None).await?;

    let reservation: Reservation = sqlx::query_as(
        "INSERT INTO reservations (table_id, customer_name, customer_phone, start_at, end_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(payload.table_id)
    .bind(payload.customer_name)
    .bind(payload.customer_phone)
    .bind(payload.start_at)
    .bind(payload.end_at)
    .fetch_one(pool)
    .await?;

    Ok(reservation)
}

pub async fn update_reservation(
    pool: &DbPool,
    id: i64,
    payload: UpdateReservationRequest,
) -> AppResult<Reservation> {
    if !RESERVATION_STATUSES.contains(&payload.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown reservation status '{}'",
            payload.status
        )));
    }

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM reservations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        return Err(AppError::NotFound);
    }

    validate_window(
        pool,
        payload.table_id,
        payload.start_at,
        payload.end_at,
        Some(id),
    )
    .await?;

    let reservation: Reservation = sqlx::query_as(
        "UPDATE reservations
         SET table_id = $1, customer_name = $2, customer_phone = $3,
             start_at = $4, end_at = $5, status = $6
         WHERE id = $7 RETURNING *",
    )
    .bind(payload.table_id)
    .bind(payload.customer_name)
    .bind(payload.customer_phone)
    .bind(payload.start_at)
    .bind(payload.end_at)
    .bind(payload.status)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(reservation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, min, 0).unwrap()
    }

    #[test]
    fn overlapping_windows_conflict() {
        assert!(overlaps(at(18, 0), at(20, 0), at(19, 0), at(21, 0)));
        assert!(overlaps(at(19, 0), at(21, 0), at(18, 0), at(20, 0)));
        // containment either way
        assert!(overlaps(at(18, 0), at(22, 0), at(19, 0), at(20, 0)));
        assert!(overlaps(at(19, 0), at(20, 0), at(18, 0), at(22, 0)));
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        assert!(!overlaps(at(18, 0), at(20, 0), at(20, 0), at(22, 0)));
        assert!(!overlaps(at(20, 0), at(22, 0), at(18, 0), at(20, 0)));
    }

    #[test]
    fn disjoint_windows_do_not_conflict() {
        assert!(!overlaps(at(18, 0), at(19, 0), at(20, 0), at(21, 0)));
    }

    #[test]
    fn recent_order_blocks_reservation() {
        // Created 90 minutes before the start: inside the two-hour buffer.
        assert!(blocks_reservation(at(16, 30), at(18, 0)));
    }

    #[test]
    fn old_order_does_not_block_reservation() {
        // Created three hours before the start: outside the buffer.
        assert!(!blocks_reservation(at(15, 0), at(18, 0)));
    }

    #[test]
    fn boundary_order_exactly_two_hours_before_blocks() {
        assert!(blocks_reservation(at(16, 0), at(18, 0)));
    }

    #[test]
    fn order_from_previous_day_does_not_block() {
        let created = Utc.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 0, 30, 0).unwrap();
        assert!(!blocks_reservation(created, start));
    }

    #[test]
    fn occupancy_reason_precedence() {
        assert_eq!(occupancy_reason(true, 3, 2), AvailabilityReason::Occupied);
        assert_eq!(
            occupancy_reason(false, 3, 2),
            AvailabilityReason::ActiveOrders
        );
        assert_eq!(occupancy_reason(false, 0, 2), AvailabilityReason::Reserved);
        assert_eq!(occupancy_reason(false, 0, 0), AvailabilityReason::Available);
    }

    #[test]
    fn window_reason_precedence() {
        assert_eq!(window_reason(1, 1), AvailabilityReason::Reserved);
        assert_eq!(window_reason(0, 1), AvailabilityReason::ActiveOrders);
        assert_eq!(window_reason(0, 0), AvailabilityReason::Available);
    }
}

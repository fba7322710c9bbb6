use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::{
    db::DbPool,
    dto::tables::{
        CreateTableRequest, TableAvailability, TableWindowAvailability, UpdateTableRequest,
    },
    error::{AppError, AppResult},
    models::DiningTable,
    services::availability::{
        AvailabilityReason, ORDER_BLOCK_HOURS, blocks_reservation, occupancy_reason, overlaps,
        window_reason,
    },
};

pub async fn list_tables(pool: &DbPool) -> AppResult<Vec<DiningTable>> {
    let tables: Vec<DiningTable> = sqlx::query_as("SELECT * FROM tables ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(tables)
}

pub async fn get_table(pool: &DbPool, id: i64) -> AppResult<DiningTable> {
    let table: Option<DiningTable> = sqlx::query_as("SELECT * FROM tables WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    table.ok_or(AppError::NotFound)
}

/// QR-code lookup; the token is the only thing printed on the table.
pub async fn get_table_by_token(pool: &DbPool, token: &str) -> AppResult<DiningTable> {
    let table: Option<DiningTable> = sqlx::query_as("SELECT * FROM tables WHERE token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await?;
    table.ok_or(AppError::NotFound)
}

pub async fn create_table(pool: &DbPool, payload: CreateTableRequest) -> AppResult<DiningTable> {
    let table: DiningTable =
        sqlx::query_as("INSERT INTO tables (name, seats) VALUES ($1, $2) RETURNING *")
            .bind(payload.name)
            .bind(payload.seats)
            .fetch_one(pool)
            .await?;
    Ok(table)
}

pub async fn update_table(
    pool: &DbPool,
    id: i64,
    payload: UpdateTableRequest,
) -> AppResult<DiningTable> {
    let table: Option<DiningTable> = sqlx::query_as(
        "UPDATE tables SET name = $1, seats = $2, is_occupied = $3 WHERE id = $4 RETURNING *",
    )
    .bind(payload.name)
    .bind(payload.seats)
    .bind(payload.is_occupied)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    table.ok_or(AppError::NotFound)
}

pub async fn update_table_status(
    pool: &DbPool,
    id: i64,
    is_occupied: bool,
) -> AppResult<DiningTable> {
    let table: Option<DiningTable> =
        sqlx::query_as("UPDATE tables SET is_occupied = $1 WHERE id = $2 RETURNING *")
            .bind(is_occupied)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    table.ok_or(AppError::NotFound)
}

/// A table cannot go while it still has open orders or active reservations.
pub async fn delete_table(pool: &DbPool, id: i64) -> AppResult<DiningTable> {
    let open_orders: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders
         WHERE table_id = $1 AND status NOT IN ('completed', 'cancelled')",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if open_orders.0 > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a table with active orders. Complete them first".into(),
        ));
    }

    let active_reservations: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM reservations
         WHERE table_id = $1 AND status IN ('pending', 'confirmed')",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if active_reservations.0 > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a table with active reservations. Cancel them first".into(),
        ));
    }

    let table: Option<DiningTable> =
        sqlx::query_as("DELETE FROM tables WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    table.ok_or(AppError::NotFound)
}

#[derive(Debug, sqlx::FromRow)]
struct ActiveReservationRow {
    table_id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OpenOrderRow {
    table_id: i64,
    created_at: DateTime<Utc>,
}

async fn load_active_reservations(pool: &DbPool) -> AppResult<Vec<ActiveReservationRow>> {
    let rows = sqlx::query_as(
        "SELECT table_id, start_at, end_at FROM reservations
         WHERE status IN ('pending', 'confirmed')",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn load_open_orders(pool: &DbPool) -> AppResult<Vec<OpenOrderRow>> {
    let rows = sqlx::query_as(
        "SELECT table_id, created_at FROM orders
         WHERE table_id IS NOT NULL AND status NOT IN ('completed', 'cancelled')",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Availability of every table right now, driven by the occupied flag and
/// whatever open activity the table carries. Three batched reads, no
/// per-table queries.
pub async fn tables_with_availability(pool: &DbPool) -> AppResult<Vec<TableAvailability>> {
    let tables = list_tables(pool).await?;
    let reservations = load_active_reservations(pool).await?;
    let orders = load_open_orders(pool).await?;

    let mut reservations_by_table: HashMap<i64, i64> = HashMap::new();
    for r in &reservations {
        *reservations_by_table.entry(r.table_id).or_default() += 1;
    }
    let mut orders_by_table: HashMap<i64, i64> = HashMap::new();
    for o in &orders {
        *orders_by_table.entry(o.table_id).or_default() += 1;
    }

    Ok(tables
        .into_iter()
        .map(|t| {
            let active_orders_count = orders_by_table.get(&t.id).copied().unwrap_or(0);
            let active_reservations_count = reservations_by_table.get(&t.id).copied().unwrap_or(0);
            let reason =
                occupancy_reason(t.is_occupied, active_orders_count, active_reservations_count);
            TableAvailability {
                id: t.id,
                name: t.name,
                seats: t.seats,
                is_occupied: t.is_occupied,
                active_orders_count,
                active_reservations_count,
                is_available: reason == AvailabilityReason::Available,
                availability_reason: reason,
            }
        })
        .collect())
}

/// Availability of every table for a two-hour window starting at the given
/// instant, applying the same overlap and order-block rules the reservation
/// pipeline uses.
pub async fn tables_availability_for_window(
    pool: &DbPool,
    start_at: DateTime<Utc>,
) -> AppResult<Vec<TableWindowAvailability>> {
    let end_at = start_at + Duration::hours(ORDER_BLOCK_HOURS);

    let tables = list_tables(pool).await?;
    let reservations = load_active_reservations(pool).await?;
    let orders = load_open_orders(pool).await?;

    let mut conflicts_by_table: HashMap<i64, i64> = HashMap::new();
    for r in &reservations {
        if overlaps(start_at, end_at, r.start_at, r.end_at) {
            *conflicts_by_table.entry(r.table_id).or_default() += 1;
        }
    }
    let mut orders_by_table: HashMap<i64, i64> = HashMap::new();
    for o in &orders {
        if blocks_reservation(o.created_at, start_at) {
            *orders_by_table.entry(o.table_id).or_default() += 1;
        }
    }

    Ok(tables
        .into_iter()
        .map(|t| {
            let conflicting_reservations_count = conflicts_by_table.get(&t.id).copied().unwrap_or(0);
            let active_orders_count = orders_by_table.get(&t.id).copied().unwrap_or(0);
            let reason = window_reason(conflicting_reservations_count, active_orders_count);
            TableWindowAvailability {
                id: t.id,
                name: t.name,
                seats: t.seats,
                conflicting_reservations_count,
                active_orders_count,
                is_available: reason == AvailabilityReason::Available,
                availability_reason: reason,
            }
        })
        .collect())
}

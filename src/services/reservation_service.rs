use crate::{
    db::DbPool,
    dto::reservations::ReservationDetail,
    error::{AppError, AppResult},
    models::{RESERVATION_STATUSES, Reservation},
};

pub async fn list_reservations(pool: &DbPool) -> AppResult<Vec<ReservationDetail>> {
    let reservations: Vec<ReservationDetail> = sqlx::query_as(
        "SELECT r.id, r.table_id, t.name AS table_name, r.customer_name, r.customer_phone,
                r.start_at, r.end_at, r.status, r.created_at
         FROM reservations r
         JOIN tables t ON r.table_id = t.id
         ORDER BY r.start_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(reservations)
}

pub async fn get_reservation(pool: &DbPool, id: i64) -> AppResult<ReservationDetail> {
    let reservation: Option<ReservationDetail> = sqlx::query_as(
        "SELECT r.id, r.table_id, t.name AS table_name, r.customer_name, r.customer_phone,
                r.start_at, r.end_at, r.status, r.created_at
         FROM reservations r
         JOIN tables t ON r.table_id = t.id
         WHERE r.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    reservation.ok_or(AppError::NotFound)
}

pub async fn update_reservation_status(
    pool: &DbPool,
    id: i64,
    status: String,
) -> AppResult<Reservation> {
    if !RESERVATION_STATUSES.contains(&status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown reservation status '{status}'"
        )));
    }
    let reservation: Option<Reservation> =
        sqlx::query_as("UPDATE reservations SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    reservation.ok_or(AppError::NotFound)
}

/// A reservation referenced by orders must keep existing; the orders go first.
pub async fn delete_reservation(pool: &DbPool, id: i64) -> AppResult<Reservation> {
    let referencing_orders: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE reservation_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if referencing_orders.0 > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a reservation with associated orders. Delete the orders first".into(),
        ));
    }

    let reservation: Option<Reservation> =
        sqlx::query_as("DELETE FROM reservations WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    reservation.ok_or(AppError::NotFound)
}

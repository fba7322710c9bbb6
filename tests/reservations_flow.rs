use axum_restaurant_api::{
    db::{DbPool, create_pool, run_migrations},
    dto::reservations::{CreateReservationRequest, UpdateReservationRequest},
    error::AppError,
    services::{availability, reservation_service, table_service},
};
use chrono::{DateTime, TimeZone, Utc};

// All windows sit on a fixed future date so the calendar-day rule in the
// order-block check behaves the same no matter when the test runs.
fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 15, hour, min, 0).unwrap()
}

fn reservation_input(table_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> CreateReservationRequest {
    CreateReservationRequest {
        table_id,
        customer_name: "Ana".into(),
        customer_phone: "+100200300".into(),
        start_at: start,
        end_at: end,
    }
}

// Integration flow over the reservation pipeline: overlap rejection,
// half-open boundaries, the two-hour order block, and the delete guards.
#[tokio::test]
async fn reservation_pipeline_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let pool = setup(&database_url).await?;

    let table_a = seed_table(&pool, "Window table").await?;
    let table_b = seed_table(&pool, "Patio table").await?;

    // Unknown table fails before any conflict check.
    let err = availability::create_reservation(&pool, reservation_input(9999, at(18, 0), at(20, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Inverted window is rejected.
    let err = availability::create_reservation(&pool, reservation_input(table_a, at(20, 0), at(18, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // First reservation lands with status pending.
    let first =
        availability::create_reservation(&pool, reservation_input(table_a, at(18, 0), at(20, 0)))
            .await?;
    assert_eq!(first.status, "pending");

    // Overlapping window on the same table is rejected.
    let err = availability::create_reservation(&pool, reservation_input(table_a, at(19, 0), at(21, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Touching the end exactly is not a conflict (half-open interval).
    let second =
        availability::create_reservation(&pool, reservation_input(table_a, at(20, 0), at(22, 0)))
            .await?;

    // Same window on another table is fine.
    let on_patio =
        availability::create_reservation(&pool, reservation_input(table_b, at(19, 0), at(21, 0)))
            .await?;

    // Updating a reservation ignores its own window in the conflict scan.
    let updated = availability::update_reservation(
        &pool,
        first.id,
        UpdateReservationRequest {
            table_id: table_a,
            customer_name: "Ana".into(),
            customer_phone: "+100200300".into(),
            start_at: at(18, 30),
            end_at: at(20, 0),
            status: "confirmed".into(),
        },
    )
    .await?;
    assert_eq!(updated.status, "confirmed");

    // ...but still collides with everyone else's.
    let err = availability::update_reservation(
        &pool,
        first.id,
        UpdateReservationRequest {
            table_id: table_a,
            customer_name: "Ana".into(),
            customer_phone: "+100200300".into(),
            start_at: at(19, 30),
            end_at: at(21, 0),
            status: "confirmed".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // A cancelled reservation stops blocking its window.
    reservation_service::update_reservation_status(&pool, second.id, "cancelled".into()).await?;
    availability::create_reservation(&pool, reservation_input(table_a, at(20, 30), at(21, 30)))
        .await?;

    // An open order created 90 minutes before the window start blocks it.
    let table_c = seed_table(&pool, "Bar table").await?;
    let order_id = seed_order_at(&pool, table_c, at(16, 30)).await?;
    let err = availability::create_reservation(&pool, reservation_input(table_c, at(18, 0), at(20, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Three hours after the order was created the window is clear again.
    availability::create_reservation(&pool, reservation_input(table_c, at(19, 30), at(21, 30)))
        .await?;

    // The table with an open order cannot be deleted.
    let err = table_service::delete_table(&pool, table_c).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Completing the order is not enough while reservations stay active.
    sqlx::query("UPDATE orders SET status = 'completed', completed_at = NOW() WHERE id = $1")
        .bind(order_id)
        .execute(&pool)
        .await?;
    let err = table_service::delete_table(&pool, table_c).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Cancelling the remaining reservation frees the table for deletion.
    let remaining: Vec<(i64,)> = sqlx::query_as(
        "SELECT id FROM reservations WHERE table_id = $1 AND status IN ('pending', 'confirmed')",
    )
    .bind(table_c)
    .fetch_all(&pool)
    .await?;
    for (id,) in remaining {
        reservation_service::update_reservation_status(&pool, id, "cancelled".into()).await?;
    }
    table_service::delete_table(&pool, table_c).await?;

    // A reservation with orders attached to it cannot be deleted.
    let (attached_order,): (i64,) = sqlx::query_as(
        "INSERT INTO orders (table_id, reservation_id, order_type, customer_name,
                             customer_phone, status, total_amount)
         VALUES ($1, $2, 'dine_in', 'Ana', '+100200300', 'completed', 500) RETURNING id",
    )
    .bind(table_b)
    .bind(on_patio.id)
    .fetch_one(&pool)
    .await?;
    let err = reservation_service::delete_reservation(&pool, on_patio.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Once the order is gone the reservation can be deleted.
    sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(attached_order)
        .execute(&pool)
        .await?;
    let deleted = reservation_service::delete_reservation(&pool, on_patio.id).await?;
    assert_eq!(deleted.id, on_patio.id);
    assert!(matches!(
        reservation_service::delete_reservation(&pool, on_patio.id)
            .await
            .unwrap_err(),
        AppError::NotFound
    ));

    Ok(())
}

async fn setup(database_url: &str) -> anyhow::Result<DbPool> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE order_items, orders, reservations, menu_items, categories, tables, users \
         RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

async fn seed_table(pool: &DbPool, name: &str) -> anyhow::Result<i64> {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO tables (name, seats) VALUES ($1, 4) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(id)
}

async fn seed_order_at(
    pool: &DbPool,
    table_id: i64,
    created_at: DateTime<Utc>,
) -> anyhow::Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO orders (table_id, order_type, customer_name, customer_phone,
                             status, total_amount, created_at)
         VALUES ($1, 'dine_in', 'Walk-in', '-', 'preparing', 1000, $2) RETURNING id",
    )
    .bind(table_id)
    .bind(created_at)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

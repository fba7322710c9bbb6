use std::time::Duration;

use axum_restaurant_api::{
    db::{DbPool, create_pool, run_migrations},
    dto::orders::{CreateOrderRequest, OrderItemInput},
    error::AppError,
    services::{
        notifier::{OrderNotifier, poll_new_orders},
        order_service,
    },
};

fn line(menu_item_id: i64, quantity: i32, unit_price: i64) -> OrderItemInput {
    OrderItemInput {
        menu_item_id,
        quantity,
        unit_price,
        item_comment: None,
    }
}

fn order_input(items: Vec<OrderItemInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        table_id: None,
        reservation_id: None,
        order_type: "takeaway".into(),
        customer_name: "Walk-in".into(),
        customer_phone: "+100200300".into(),
        comment: None,
        items,
    }
}

// Integration flow over order creation, status transitions, and the poll
// cursor that feeds the notification stream.
#[tokio::test]
async fn order_pipeline_flow() -> anyhow::Result<()> {
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
    let (soup_id, bread_id) = seed_menu(&pool).await?;

    // Orders without lines are rejected, as are non-positive quantities.
    let err = order_service::create_order(&pool, order_input(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = order_service::create_order(&pool, order_input(vec![line(soup_id, 0, 100)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Total is the sum of unit_price * quantity over the submitted lines.
    let created = order_service::create_order(
        &pool,
        order_input(vec![line(soup_id, 2, 100), line(bread_id, 1, 50)]),
    )
    .await?;
    let order_id = created.data.as_ref().map(|d| d.order_id).unwrap_or(0);
    let (total,): (i64,) = sqlx::query_as("SELECT total_amount FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(total, 250);

    // Unknown status values never reach the database.
    let err = order_service::update_order_status(&pool, order_id, "shipped".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = order_service::update_order_status(&pool, 9999, "preparing".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // completed_at is stamped on the first transition into 'completed' and
    // kept on repeats.
    let updated = order_service::update_order_status(&pool, order_id, "completed".into()).await?;
    let first_completed_at = updated
        .data
        .as_ref()
        .and_then(|o| o.order.completed_at);
    assert!(first_completed_at.is_some());

    let repeated = order_service::update_order_status(&pool, order_id, "completed".into()).await?;
    assert_eq!(
        repeated.data.as_ref().and_then(|o| o.order.completed_at),
        first_completed_at
    );

    // The poll cursor walks forward without replaying or skipping orders.
    let second = order_service::create_order(&pool, order_input(vec![line(bread_id, 3, 50)]))
        .await?;
    let second_id = second.data.as_ref().map(|d| d.order_id).unwrap_or(0);

    let (batch, cursor) = poll_new_orders(&pool, 0)
        .await?
        .ok_or_else(|| anyhow::anyhow!("expected a first batch"))?;
    let ids: Vec<i64> = batch.iter().map(|o| o.order.id).collect();
    assert_eq!(ids, vec![order_id, second_id]);
    assert_eq!(cursor, second_id);
    assert_eq!(batch[0].items.len(), 2);
    assert_eq!(batch[0].items[0].menu_item_name.as_deref(), Some("Soup"));

    // Nothing new past the watermark.
    assert!(poll_new_orders(&pool, cursor).await?.is_none());

    // The next creation shows up exactly once, after the watermark.
    let third = order_service::create_order(&pool, order_input(vec![line(soup_id, 1, 100)]))
        .await?;
    let third_id = third.data.as_ref().map(|d| d.order_id).unwrap_or(0);
    let (batch, cursor) = poll_new_orders(&pool, cursor)
        .await?
        .ok_or_else(|| anyhow::anyhow!("expected a second batch"))?;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].order.id, third_id);
    assert_eq!(cursor, third_id);

    // Live subscribers receive the broadcast batch; a dropped receiver just
    // deregisters without disturbing the others.
    let notifier = OrderNotifier::spawn(pool.clone(), Duration::from_millis(50)).await?;
    let (_client_a, mut rx_a) = notifier.subscribe();
    let (_client_b, rx_b) = notifier.subscribe();
    assert_eq!(notifier.subscriber_count(), 2);
    drop(rx_b);

    let fourth = order_service::create_order(&pool, order_input(vec![line(bread_id, 2, 50)]))
        .await?;
    let fourth_id = fourth.data.as_ref().map(|d| d.order_id).unwrap_or(0);

    let received = tokio::time::timeout(Duration::from_secs(5), rx_a.recv()).await??;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].order.id, fourth_id);

    notifier.shutdown();
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

async fn seed_menu(pool: &DbPool) -> anyhow::Result<(i64, i64)> {
    let (category_id,): (i64,) =
        sqlx::query_as("INSERT INTO categories (name) VALUES ('Starters') RETURNING id")
            .fetch_one(pool)
            .await?;
    let (soup_id,): (i64,) = sqlx::query_as(
        "INSERT INTO menu_items (category_id, name, price) VALUES ($1, 'Soup', 100) RETURNING id",
    )
    .bind(category_id)
    .fetch_one(pool)
    .await?;
    let (bread_id,): (i64,) = sqlx::query_as(
        "INSERT INTO menu_items (category_id, name, price) VALUES ($1, 'Bread', 50) RETURNING id",
    )
    .bind(category_id)
    .fetch_one(pool)
    .await?;
    Ok((soup_id, bread_id))
}

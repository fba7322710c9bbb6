use std::collections::HashMap;

use crate::{
    db::DbPool,
    dto::orders::{
        CreateOrderRequest, CreateOrderResponse, OrderItemDetail, OrderList, OrderWithItems,
    },
    error::{AppError, AppResult},
    models::{ORDER_STATUSES, Order},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

/// One batched lookup for the lines of several orders, enriched with the
/// menu item name and description.
pub async fn fetch_items_for(pool: &DbPool, order_ids: &[i64]) -> AppResult<Vec<OrderItemDetail>> {
    let items: Vec<OrderItemDetail> = sqlx::query_as(
        "SELECT oi.id, oi.order_id, oi.quantity, oi.unit_price, oi.item_comment,
                mi.name AS menu_item_name, mi.description AS menu_item_description
         FROM order_items oi
         LEFT JOIN menu_items mi ON oi.menu_item_id = mi.id
         WHERE oi.order_id = ANY($1)
         ORDER BY oi.order_id, oi.id",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Groups pre-fetched lines under their orders, preserving the order of
/// `orders`. An order with no lines gets an empty list.
pub fn attach_items(orders: Vec<Order>, items: Vec<OrderItemDetail>) -> Vec<OrderWithItems> {
    let mut by_order: HashMap<i64, Vec<OrderItemDetail>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect()
}

pub async fn list_orders(
    pool: &DbPool,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, per_page, offset) = pagination.normalize();

    let orders: Vec<Order> = sqlx::query_as(
        "SELECT * FROM orders ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = fetch_items_for(pool, &ids).await?;

    Ok(ApiResponse::paginated(
        "Orders",
        OrderList {
            items: attach_items(orders, items),
        },
        Meta::paginated(page, per_page, total.0),
    ))
}

pub async fn create_order(
    pool: &DbPool,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreateOrderResponse>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Order must contain items".into()));
    }
    if payload.items.iter().any(|item| item.quantity <= 0) {
        return Err(AppError::BadRequest(
            "Order item quantity must be positive".into(),
        ));
    }

    // Total is fixed at creation from the submitted line prices.
    let total_amount: i64 = payload
        .items
        .iter()
        .map(|item| item.unit_price * item.quantity as i64)
        .sum();

    let mut txn = pool.begin().await?;

    let order: Order = sqlx::query_as(
        "INSERT INTO orders (table_id, reservation_id, order_type, customer_name,
                             customer_phone, comment, total_amount)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(payload.table_id)
    .bind(payload.reservation_id)
    .bind(payload.order_type)
    .bind(payload.customer_name)
    .bind(payload.customer_phone)
    .bind(payload.comment)
    .bind(total_amount)
    .fetch_one(&mut *txn)
    .await?;

    for item in &payload.items {
        sqlx::query(
            "INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price, item_comment)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order.id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.item_comment.as_deref())
        .execute(&mut *txn)
        .await?;
    }

    txn.commit().await?;

    tracing::info!(order_id = order.id, total_amount, "order created");

    Ok(ApiResponse::success(
        "Order created",
        CreateOrderResponse { order_id: order.id },
    ))
}

pub async fn update_order_status(
    pool: &DbPool,
    id: i64,
    status: String,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if !ORDER_STATUSES.contains(&status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown order status '{status}'"
        )));
    }

    let mut txn = pool.begin().await?;

    // completed_at is stamped once, on the transition into 'completed'.
    let order: Option<Order> = if status == "completed" {
        sqlx::query_as(
            "UPDATE orders SET status = $1, completed_at = COALESCE(completed_at, NOW())
             WHERE id = $2 RETURNING *",
        )
        .bind(&status)
        .bind(id)
        .fetch_optional(&mut *txn)
        .await?
    } else {
        sqlx::query_as("UPDATE orders SET status = $1 WHERE id = $2 RETURNING *")
            .bind(&status)
            .bind(id)
            .fetch_optional(&mut *txn)
            .await?
    };

    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items: Vec<OrderItemDetail> = sqlx::query_as(
        "SELECT oi.id, oi.order_id, oi.quantity, oi.unit_price, oi.item_comment,
                mi.name AS menu_item_name, mi.description AS menu_item_description
         FROM order_items oi
         LEFT JOIN menu_items mi ON oi.menu_item_id = mi.id
         WHERE oi.order_id = $1
         ORDER BY oi.id",
    )
    .bind(order.id)
    .fetch_all(&mut *txn)
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Order status updated",
        OrderWithItems { order, items },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn order(id: i64) -> Order {
        Order {
            id,
            table_id: None,
            reservation_id: None,
            order_type: "takeaway".into(),
            customer_name: "n".into(),
            customer_phone: "p".into(),
            comment: None,
            status: "pending".into(),
            total_amount: 0,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn item(id: i64, order_id: i64) -> OrderItemDetail {
        OrderItemDetail {
            id,
            order_id,
            quantity: 1,
            unit_price: 100,
            item_comment: None,
            menu_item_name: None,
            menu_item_description: None,
        }
    }

    #[test]
    fn attach_items_preserves_order_sequence() {
        let grouped = attach_items(
            vec![order(5), order(6), order(7)],
            vec![item(1, 6), item(2, 5), item(3, 5)],
        );
        let ids: Vec<i64> = grouped.iter().map(|o| o.order.id).collect();
        assert_eq!(ids, vec![5, 6, 7]);
        assert_eq!(grouped[0].items.len(), 2);
        assert_eq!(grouped[1].items.len(), 1);
        assert!(grouped[2].items.is_empty());
    }

    #[test]
    fn attach_items_never_duplicates_lines() {
        let grouped = attach_items(vec![order(1), order(2)], vec![item(10, 1), item(11, 2)]);
        let total: usize = grouped.iter().map(|o| o.items.len()).sum();
        assert_eq!(total, 2);
    }
}

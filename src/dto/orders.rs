use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Order;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: i64,
    pub item_comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub table_id: Option<i64>,
    pub reservation_id: Option<i64>,
    pub order_type: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub comment: Option<String>,
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Order line enriched with the menu item it points at.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct OrderItemDetail {
    pub id: i64,
    pub order_id: i64,
    pub quantity: i32,
    pub unit_price: i64,
    pub item_comment: Option<String>,
    pub menu_item_name: Option<String>,
    pub menu_item_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}

use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, PublicUser, VerifyResponse},
        categories::{CategoryList, CategoryPayload},
        menu::{CreateMenuItemRequest, MenuItemDetail, MenuItemList, UpdateMenuItemRequest},
        orders::{
            CreateOrderRequest, CreateOrderResponse, OrderItemDetail, OrderItemInput, OrderList,
            OrderWithItems, UpdateOrderStatusRequest,
        },
        reservations::{
            CreateReservationRequest, ReservationDetail, ReservationList,
            UpdateReservationRequest, UpdateReservationStatusRequest,
        },
        tables::{
            CreateTableRequest, TableAvailability, TableAvailabilityList, TableList,
            TableWindowAvailability, TableWindowAvailabilityList, UpdateTableRequest,
            UpdateTableStatusRequest,
        },
    },
    models::{Category, DiningTable, MenuItem, Order, OrderItem, Reservation},
    response::{ApiResponse, Meta},
    routes::{
        auth, categories, health, menu, orders, params, reservations, tables, uploads,
    },
    services::availability::AvailabilityReason,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::verify,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        menu::list_menu_items,
        menu::list_menu_items_paginated,
        menu::get_menu_item,
        menu::create_menu_item,
        menu::update_menu_item,
        menu::delete_menu_item,
        tables::list_tables,
        tables::tables_with_availability,
        tables::tables_availability_for_window,
        tables::get_table,
        tables::get_table_by_token,
        tables::create_table,
        tables::update_table,
        tables::update_table_status,
        tables::delete_table,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::update_reservation,
        reservations::update_reservation_status,
        reservations::delete_reservation,
        orders::list_orders,
        orders::create_order,
        orders::update_order_status,
        orders::stream_orders,
        uploads::upload_image,
        uploads::delete_image,
    ),
    components(
        schemas(
            Category,
            DiningTable,
            MenuItem,
            Order,
            OrderItem,
            Reservation,
            AvailabilityReason,
            LoginRequest,
            LoginResponse,
            PublicUser,
            VerifyResponse,
            CategoryPayload,
            CategoryList,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuItemDetail,
            MenuItemList,
            CreateOrderRequest,
            CreateOrderResponse,
            OrderItemInput,
            OrderItemDetail,
            OrderWithItems,
            OrderList,
            UpdateOrderStatusRequest,
            CreateReservationRequest,
            UpdateReservationRequest,
            UpdateReservationStatusRequest,
            ReservationDetail,
            ReservationList,
            CreateTableRequest,
            UpdateTableRequest,
            UpdateTableStatusRequest,
            TableAvailability,
            TableAvailabilityList,
            TableWindowAvailability,
            TableWindowAvailabilityList,
            TableList,
            params::Pagination,
            params::MenuQuery,
            uploads::UploadResponse,
            Meta,
            ApiResponse<Reservation>,
            ApiResponse<OrderList>,
            ApiResponse<TableAvailabilityList>,
            ApiResponse<MenuItemList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Admin authentication"),
        (name = "Categories", description = "Menu category endpoints"),
        (name = "Menu", description = "Menu item endpoints"),
        (name = "Tables", description = "Dining table and availability endpoints"),
        (name = "Reservations", description = "Reservation endpoints"),
        (name = "Orders", description = "Order endpoints and the notification stream"),
        (name = "Uploads", description = "Menu image uploads"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

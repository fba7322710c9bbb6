pub mod auth_service;
pub mod availability;
pub mod category_service;
pub mod menu_service;
pub mod notifier;
pub mod order_service;
pub mod reservation_service;
pub mod table_service;

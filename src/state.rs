use std::time::Duration;

use crate::{
    cache::TtlCache, db::DbPool, dto::menu::MenuItemDetail, files::FileStore, models::Category,
    services::notifier::OrderNotifier,
};

const MENU_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const CATEGORIES_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Everything a handler needs, created once at startup and injected through
/// axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub notifier: OrderNotifier,
    pub files: FileStore,
    pub menu_cache: TtlCache<Vec<MenuItemDetail>>,
    pub categories_cache: TtlCache<Vec<Category>>,
}

impl AppState {
    pub fn new(pool: DbPool, notifier: OrderNotifier, files: FileStore) -> Self {
        Self {
            pool,
            notifier,
            files,
            menu_cache: TtlCache::new(MENU_CACHE_TTL),
            categories_cache: TtlCache::new(CATEGORIES_CACHE_TTL),
        }
    }
}

use crate::{
    dto::menu::{CreateMenuItemRequest, MenuItemDetail, UpdateMenuItemRequest},
    error::{AppError, AppResult},
    models::MenuItem,
    response::{ApiResponse, Meta},
    routes::params::MenuQuery,
    state::AppState,
};

const DETAIL_COLUMNS: &str = "m.id, m.category_id, c.name AS category_name, m.name,
                              m.description, m.price, m.image_url, m.available";

/// Full menu, served from the TTL cache when warm.
pub async fn list_menu_items(state: &AppState) -> AppResult<Vec<MenuItemDetail>> {
    if let Some(cached) = state.menu_cache.get() {
        return Ok(cached);
    }
    let items: Vec<MenuItemDetail> = sqlx::query_as(&format!(
        "SELECT {DETAIL_COLUMNS}
         FROM menu_items m
         LEFT JOIN categories c ON m.category_id = c.id
         ORDER BY m.id DESC"
    ))
    .fetch_all(&state.pool)
    .await?;
    state.menu_cache.put(items.clone());
    Ok(items)
}

pub async fn list_menu_items_paginated(
    state: &AppState,
    query: MenuQuery,
) -> AppResult<ApiResponse<Vec<MenuItemDetail>>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let (items, total): (Vec<MenuItemDetail>, (i64,)) = if let Some(category_id) = query.category_id
    {
        let items = sqlx::query_as(&format!(
            "SELECT {DETAIL_COLUMNS}
             FROM menu_items m
             LEFT JOIN categories c ON m.category_id = c.id
             WHERE m.category_id = $3
             ORDER BY m.id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(per_page)
        .bind(offset)
        .bind(category_id)
        .fetch_all(&state.pool)
        .await?;
        let total = sqlx::query_as("SELECT COUNT(*) FROM menu_items WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&state.pool)
            .await?;
        (items, total)
    } else {
        let items = sqlx::query_as(&format!(
            "SELECT {DETAIL_COLUMNS}
             FROM menu_items m
             LEFT JOIN categories c ON m.category_id = c.id
             ORDER BY m.id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;
        let total = sqlx::query_as("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&state.pool)
            .await?;
        (items, total)
    };

    Ok(ApiResponse::paginated(
        "Menu",
        items,
        Meta::paginated(page, per_page, total.0),
    ))
}

pub async fn get_menu_item(state: &AppState, id: i64) -> AppResult<MenuItemDetail> {
    let item: Option<MenuItemDetail> = sqlx::query_as(&format!(
        "SELECT {DETAIL_COLUMNS}
         FROM menu_items m
         LEFT JOIN categories c ON m.category_id = c.id
         WHERE m.id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    item.ok_or(AppError::NotFound)
}

pub async fn create_menu_item(
    state: &AppState,
    payload: CreateMenuItemRequest,
) -> AppResult<MenuItem> {
    let item: MenuItem = sqlx::query_as(
        "INSERT INTO menu_items (category_id, name, description, price, image_url, available)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(payload.category_id)
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.image_url)
    .bind(payload.available.unwrap_or(true))
    .fetch_one(&state.pool)
    .await?;

    state.menu_cache.invalidate();
    Ok(item)
}

pub async fn update_menu_item(
    state: &AppState,
    id: i64,
    payload: UpdateMenuItemRequest,
) -> AppResult<MenuItem> {
    let existing: Option<MenuItem> = sqlx::query_as("SELECT * FROM menu_items WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = existing.ok_or(AppError::NotFound)?;

    // A replaced image is deleted from the file store; a kept one stays.
    let image_url = match payload.image_url {
        Some(new_url) => {
            if let Some(old_url) = &existing.image_url
                && *old_url != new_url
            {
                let _ = state.files.delete_url(old_url).await;
            }
            Some(new_url)
        }
        None => existing.image_url,
    };

    let item: MenuItem = sqlx::query_as(
        "UPDATE menu_items
         SET category_id = $1, name = $2, description = $3, price = $4,
             image_url = $5, available = $6
         WHERE id = $7 RETURNING *",
    )
    .bind(payload.category_id.or(existing.category_id))
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.description.or(existing.description))
    .bind(payload.price.unwrap_or(existing.price))
    .bind(image_url)
    .bind(payload.available.unwrap_or(existing.available))
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    state.menu_cache.invalidate();
    Ok(item)
}

/// An item that appears in any order is kept; its history depends on it.
pub async fn delete_menu_item(state: &AppState, id: i64) -> AppResult<()> {
    let referenced: Option<(i32,)> =
        sqlx::query_as("SELECT 1 FROM order_items WHERE menu_item_id = $1 LIMIT 1")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;
    if referenced.is_some() {
        return Err(AppError::BadRequest(
            "Cannot delete a menu item that is used by orders".into(),
        ));
    }

    let existing: Option<MenuItem> = sqlx::query_as("SELECT * FROM menu_items WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = existing.ok_or(AppError::NotFound)?;

    if let Some(image_url) = &existing.image_url {
        if let Err(err) = state.files.delete_url(image_url).await {
            tracing::warn!(error = %err, image_url, "failed to delete menu item image");
        }
    }

    sqlx::query("DELETE FROM menu_items WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    state.menu_cache.invalidate();
    Ok(())
}

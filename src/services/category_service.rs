use crate::{
    error::{AppError, AppResult},
    models::Category,
    state::AppState,
};

/// Reads go through the process-scoped TTL cache; every write invalidates it.
pub async fn list_categories(state: &AppState) -> AppResult<Vec<Category>> {
    if let Some(cached) = state.categories_cache.get() {
        return Ok(cached);
    }
    let categories: Vec<Category> = sqlx::query_as("SELECT * FROM categories ORDER BY id")
        .fetch_all(&state.pool)
        .await?;
    state.categories_cache.put(categories.clone());
    Ok(categories)
}

pub async fn create_category(state: &AppState, name: String) -> AppResult<Category> {
    let category: Category =
        sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&state.pool)
            .await?;
    state.categories_cache.invalidate();
    Ok(category)
}

pub async fn update_category(state: &AppState, id: i64, name: String) -> AppResult<Category> {
    let category: Option<Category> =
        sqlx::query_as("UPDATE categories SET name = $1 WHERE id = $2 RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;
    let category = category.ok_or(AppError::NotFound)?;
    state.categories_cache.invalidate();
    Ok(category)
}

pub async fn delete_category(state: &AppState, id: i64) -> AppResult<Category> {
    let category: Option<Category> =
        sqlx::query_as("DELETE FROM categories WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;
    let category = category.ok_or(AppError::NotFound)?;
    state.categories_cache.invalidate();
    Ok(category)
}


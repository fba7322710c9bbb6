use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

// Not flattened into Pagination: serde_urlencoded cannot drive
// #[serde(flatten)] over numeric query fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category_id: Option<i64>,
}

impl MenuQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

use serde::Serialize;
use utoipa::ToSchema;

/// Pagination block for list endpoints. `has_more` tells clients whether
/// another page exists without a second count request.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub has_more: bool,
}

impl Meta {
    pub fn paginated(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page,
            per_page,
            total,
            has_more: page * per_page < total,
        }
    }
}

/// Envelope shared by every endpoint, errors included.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    pub fn paginated(message: impl Into<String>, data: T, meta: Meta) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: Some(meta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_until_the_last_page() {
        assert!(Meta::paginated(1, 20, 45).has_more);
        assert!(Meta::paginated(2, 20, 45).has_more);
        assert!(!Meta::paginated(3, 20, 45).has_more);
    }

    #[test]
    fn exact_fit_has_no_more() {
        assert!(!Meta::paginated(1, 20, 20).has_more);
        assert!(!Meta::paginated(1, 20, 0).has_more);
    }
}

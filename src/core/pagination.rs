use serde::Deserialize;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Query parameters accepted by every list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    /// Free-text search (name, code, number, email depending on resource)
    #[serde(default)]
    pub search: Option<String>,
    /// Status filter for documents
    #[serde(default)]
    pub status: Option<String>,
    /// Customer filter for sales documents
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Supplier filter for purchasing documents
    #[serde(default)]
    pub supplier_id: Option<String>,
    /// Enquiry filter for supplier quotes and quotations
    #[serde(default)]
    pub enquiry_id: Option<String>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// `%term%` for LIKE queries, None when blank
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")))
    }
}

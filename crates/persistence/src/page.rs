//! Pagination parameters and result pages.

use serde::{Deserialize, Serialize};

/// Hard cap applied when a request carries no pagination at all.
pub const UNPAGED_SIZE: u64 = 10_000;

/// Optional `page`/`limit` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Items per page.
    pub limit: Option<u64>,
}

impl PageParams {
    /// Whether the caller asked for an explicit window.
    pub fn is_paged(&self) -> bool {
        self.page.is_some() && self.limit.is_some()
    }

    /// `(from, size)` for the backing query.
    ///
    /// Without both parameters the window is the unpaged cap starting at 0.
    /// Page numbers clamp to 1; a zero limit yields an empty window.
    pub fn window(&self) -> (u64, u64) {
        match (self.page, self.limit) {
            (Some(page), Some(limit)) => (page.max(1).saturating_sub(1) * limit, limit),
            _ => (0, UNPAGED_SIZE),
        }
    }
}

/// One page of results plus the counters the API reports alongside them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items in this window.
    pub data: Vec<T>,
    /// 1-based page number echoed back.
    pub page: u64,
    /// Window size echoed back. For unpaged requests this is the number of
    /// items actually returned.
    pub limit: u64,
    /// Total matching items across all pages.
    pub total: u64,
    /// Ceiling of `total / limit`; 1 for unpaged requests.
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Builds a page from a fetched window and the request parameters.
    pub fn from_window(data: Vec<T>, total: u64, params: &PageParams) -> Self {
        match (params.page, params.limit) {
            (Some(page), Some(limit)) => {
                let total_pages = if limit == 0 {
                    0
                } else {
                    total.div_ceil(limit)
                };
                Self {
                    data,
                    page: page.max(1),
                    limit,
                    total,
                    total_pages,
                }
            }
            _ => {
                let limit = data.len() as u64;
                Self {
                    data,
                    page: 1,
                    limit,
                    total,
                    total_pages: 1,
                }
            }
        }
    }

    /// Serializes the page with the item array under `key` instead of
    /// `data`, the shape most list endpoints use (`subjects`, `topics`,
    /// `users`, ...).
    pub fn into_keyed(self, key: &str) -> serde_json::Value
    where
        T: serde::Serialize,
    {
        serde_json::json!({
            "page": self.page,
            "limit": self.limit,
            "total": self.total,
            "totalPages": self.total_pages,
            key: self.data,
        })
    }

    /// Maps the items while keeping the counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

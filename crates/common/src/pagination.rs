//! Page/offset arithmetic for list queries.

use serde::{Deserialize, Serialize};

/// A page request.
///
/// Pages are 1-based. No validation is performed: zero or negative inputs
/// produce an offset that is arithmetically consistent but meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(current_page: i64, per_page: i64) -> Self {
        Self {
            current_page,
            per_page,
        }
    }

    /// Number of records to skip before this page.
    pub fn offset(&self) -> i64 {
        (self.current_page - 1) * self.per_page
    }

    /// Maximum number of records on this page.
    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            per_page: 20,
        }
    }
}

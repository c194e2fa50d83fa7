//! Query parameters and paginated results.
//!
//! Shared by the table fetch hook and the persistence `search` contract.

use serde::{Deserialize, Serialize};

use crate::value::Record;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Page/sort/filter parameters for one listing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub filters: Record,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort: None,
            order: None,
            filters: Record::new(),
        }
    }
}

impl QueryParams {
    /// Number of records before the requested page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.limit as usize
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paginated<T> {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_on_first_page() {
        let params = QueryParams::default();
        assert_eq!(params.offset(), 0);
        let params = QueryParams {
            page: 3,
            limit: 20,
            ..QueryParams::default()
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn page_zero_does_not_underflow() {
        let params = QueryParams {
            page: 0,
            ..QueryParams::default()
        };
        assert_eq!(params.offset(), 0);
    }
}

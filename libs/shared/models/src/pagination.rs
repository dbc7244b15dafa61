use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_OFFSET_LIMIT: u32 = 10;

/// How a listing endpoint asked to be paged. The legacy routes use
/// `limit`/`offset`, the mobile routes use `page`/`limit` and also report
/// [`PaginationInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Offset { limit: u32, offset: u32 },
    Page { page: u32, limit: u32 },
}

impl PageRequest {
    /// Builds an offset request from raw query values. Unparseable or
    /// non-positive limits fall back to the default, negative offsets to 0.
    pub fn from_offset_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        PageRequest::Offset {
            limit: parse_limit(limit, DEFAULT_OFFSET_LIMIT),
            offset: offset
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .filter(|value| *value >= 0)
                .map(|value| value.min(u32::MAX as i64) as u32)
                .unwrap_or(0),
        }
    }

    pub fn from_page_query(page: Option<&str>, limit: Option<&str>) -> Self {
        PageRequest::Page {
            page: page
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .filter(|value| *value >= 1)
                .map(|value| value.min(u32::MAX as i64) as u32)
                .unwrap_or(1),
            limit: parse_limit(limit, DEFAULT_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> u32 {
        match self {
            PageRequest::Offset { limit, .. } | PageRequest::Page { limit, .. } => *limit,
        }
    }

    pub fn offset(&self) -> u64 {
        match self {
            PageRequest::Offset { offset, .. } => *offset as u64,
            PageRequest::Page { page, limit } => (*page as u64).saturating_sub(1) * *limit as u64,
        }
    }

    /// Only page-style requests report totals.
    pub fn wants_total(&self) -> bool {
        matches!(self, PageRequest::Page { .. })
    }

    pub fn pagination(&self, total: u64) -> Option<PaginationInfo> {
        match self {
            PageRequest::Page { page, limit } => Some(PaginationInfo::new(*page, *limit, total)),
            PageRequest::Offset { .. } => None,
        }
    }
}

fn parse_limit(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value >= 1)
        .map(|value| value.min(MAX_PAGE_SIZE as i64) as u32)
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationInfo {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit as u64);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: (page as u64) < total_pages,
            has_prev: page > 1,
        }
    }
}

/// A page of results plus pagination info when the request asked for it.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pagination: Option<PaginationInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_info_for_45_items() {
        let first = PaginationInfo::new(1, 20, 45);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last = PaginationInfo::new(3, 20, 45);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn test_pagination_info_empty() {
        let info = PaginationInfo::new(1, 20, 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_prev);
    }

    #[test]
    fn test_page_query_defaults_and_clamping() {
        assert_eq!(PageRequest::from_page_query(None, None), PageRequest::Page { page: 1, limit: 20 });
        assert_eq!(
            PageRequest::from_page_query(Some("0"), Some("abc")),
            PageRequest::Page { page: 1, limit: 20 }
        );
        assert_eq!(
            PageRequest::from_page_query(Some("3"), Some("500")),
            PageRequest::Page { page: 3, limit: 50 }
        );
        assert_eq!(PageRequest::from_page_query(Some("3"), Some("10")).offset(), 20);
    }

    #[test]
    fn test_offset_query_defaults() {
        assert_eq!(
            PageRequest::from_offset_query(None, None),
            PageRequest::Offset { limit: 10, offset: 0 }
        );
        assert_eq!(
            PageRequest::from_offset_query(Some("-5"), Some("-1")),
            PageRequest::Offset { limit: 10, offset: 0 }
        );
        let request = PageRequest::from_offset_query(Some("5"), Some("15"));
        assert_eq!(request.limit(), 5);
        assert_eq!(request.offset(), 15);
        assert!(!request.wants_total());
        assert!(request.pagination(100).is_none());
    }
}

//! Page requests and paged results.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Validate a 1-based page number and a positive page size.
    pub fn new(page: i64, page_size: i64) -> Result<Self, String> {
        if page < 1 {
            return Err(format!("page must be >= 1, got {}", page));
        }
        if page_size < 1 {
            return Err(format!("pageSize must be >= 1, got {}", page_size));
        }
        let page = u32::try_from(page).map_err(|_| "page is too large".to_string())?;
        let page_size =
            u32::try_from(page_size).map_err(|_| "pageSize is too large".to_string())?;
        Ok(Self { page, page_size })
    }

    pub fn skip(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: usize,
}

impl<T> PagedResult<T> {
    /// Slice one page out of a fully filtered, ordered list.
    pub fn from_ordered(all: Vec<T>, request: PageRequest) -> Self {
        let total_count = all.len();
        let page_size = request.page_size as usize;
        let total_pages = total_count.div_ceil(page_size);
        let items = all
            .into_iter()
            .skip(request.skip())
            .take(page_size)
            .collect();

        Self {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
            total_pages,
        }
    }

    /// Replace the page contents, keeping the counts.
    pub fn with_items<U>(self, items: Vec<U>) -> PagedResult<U> {
        PagedResult {
            items,
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_inputs() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(-3, 10).is_err());
        assert!(PageRequest::new(1, 1).is_ok());
    }

    #[test]
    fn test_pagination_arithmetic() {
        let all: Vec<u32> = (1..=25).collect();

        let first = PagedResult::from_ordered(all.clone(), PageRequest::new(1, 10).unwrap());
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_count, 25);

        let last = PagedResult::from_ordered(all.clone(), PageRequest::new(3, 10).unwrap());
        assert_eq!(last.items, (21..=25).collect::<Vec<_>>());

        let beyond = PagedResult::from_ordered(all, PageRequest::new(4, 10).unwrap());
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_pages, 3);
    }

    #[test]
    fn test_empty_result_has_zero_pages() {
        let page = PagedResult::<u32>::from_ordered(vec![], PageRequest::new(1, 10).unwrap());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_count, 0);
    }
}

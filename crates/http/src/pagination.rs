//! Page-number pagination: `?page=N&page_size=M` in, `{count, next,
//! previous, results}` out.

use agora_kernel::settings::PaginationSettings;
use axum::http::Uri;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Raw query parameters. Kept as strings so bad input can be judged here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageParams {
    /// Resolve against configured limits. A non-numeric or zero page is a 404;
    /// a bad page size silently falls back to the default.
    pub fn resolve(&self, settings: &PaginationSettings) -> Result<PageRequest, AppError> {
        let page = match self.page.as_deref() {
            None | Some("") | Some("last") => 1,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(invalid_page)?,
        };

        let page_size = self
            .page_size
            .as_deref()
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(settings.max_page_size))
            .unwrap_or(settings.page_size);

        Ok(PageRequest { page, page_size })
    }
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn num_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.page_size).max(1)
    }

    /// Reject pages past the end. Page 1 of an empty set is fine.
    pub fn ensure_in_range(&self, count: u64) -> Result<(), AppError> {
        if self.page > self.num_pages(count) {
            return Err(invalid_page());
        }
        Ok(())
    }
}

fn invalid_page() -> AppError {
    AppError::not_found("Invalid page.")
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page; links are built relative to the request URI.
    pub fn new(results: Vec<T>, count: u64, request: PageRequest, uri: &Uri) -> Self {
        let next = (request.page < request.num_pages(count))
            .then(|| page_link(uri, Some(request.page + 1)));
        let previous = match request.page {
            1 => None,
            2 => Some(page_link(uri, None)),
            page => Some(page_link(uri, Some(page - 1))),
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Rebuild the request URI with `page` replaced (or removed when `None`).
fn page_link(uri: &Uri, page: Option<u64>) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| *pair != "page" && !pair.starts_with("page="))
        .map(str::to_string)
        .collect();

    if let Some(page) = page {
        pairs.push(format!("page={page}"));
    }

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
        }
    }

    #[test]
    fn defaults_and_caps() {
        let settings = PaginationSettings::default();

        assert_eq!(
            params(None, None).resolve(&settings).unwrap(),
            PageRequest { page: 1, page_size: 10 }
        );
        assert_eq!(
            params(Some("3"), Some("1000")).resolve(&settings).unwrap(),
            PageRequest { page: 3, page_size: 100 }
        );
        assert_eq!(
            params(None, Some("junk")).resolve(&settings).unwrap().page_size,
            10
        );
    }

    #[test]
    fn bad_page_is_not_found() {
        let settings = PaginationSettings::default();
        assert!(params(Some("abc"), None).resolve(&settings).is_err());
        assert!(params(Some("0"), None).resolve(&settings).is_err());
    }

    #[test]
    fn range_checks() {
        let request = PageRequest { page: 2, page_size: 10 };
        assert!(request.ensure_in_range(11).is_ok());
        assert!(request.ensure_in_range(10).is_err());

        let first = PageRequest { page: 1, page_size: 10 };
        assert!(first.ensure_in_range(0).is_ok());
        assert_eq!(request.offset(), 10);
    }

    #[test]
    fn links_keep_other_parameters() {
        let uri: Uri = "/api/posts?search=rust&page=2&page_size=1".parse().unwrap();
        let page = Page::new(vec!["b"], 3, PageRequest { page: 2, page_size: 1 }, &uri);

        assert_eq!(
            page.next.as_deref(),
            Some("/api/posts?search=rust&page_size=1&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("/api/posts?search=rust&page_size=1")
        );
    }

    #[test]
    fn single_page_has_no_links() {
        let uri: Uri = "/api/posts/feed".parse().unwrap();
        let page = Page::new(vec![1, 2], 2, PageRequest { page: 1, page_size: 10 }, &uri);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
        assert_eq!(page.count, 2);
    }
}

//! Page-number pagination shared by HTML listings and the REST API.

use serde::Serialize;

/// Books per catalog page.
pub const CATALOG_PAGE_SIZE: u32 = 5;

/// Records per REST API page.
pub const API_PAGE_SIZE: u32 = 100;

/// The requested page does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid page: {0}")]
pub struct InvalidPage(pub String);

/// A validated page position within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub number: u32,
    pub size: u32,
    /// Total number of records across all pages.
    pub total: i64,
}

impl PageWindow {
    /// Resolve a `?page=` value against a total record count.
    ///
    /// A missing value means page 1; `last` means the final page. The first
    /// page of an empty result set is valid.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPage`] for non-numeric values and out-of-range pages.
    pub fn resolve(raw: Option<&str>, size: u32, total: i64) -> Result<Self, InvalidPage> {
        let num_pages = num_pages(total, size);
        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(s) => s.parse::<u32>().map_err(|_| InvalidPage(s.to_string()))?,
        };

        if number == 0 || number > num_pages {
            return Err(InvalidPage(number.to_string()));
        }

        Ok(Self {
            number,
            size,
            total,
        })
    }

    /// Number of pages; at least one.
    #[must_use]
    pub fn num_pages(&self) -> u32 {
        num_pages(self.total, self.size)
    }

    /// SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }

    /// SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Next page number, if any.
    #[must_use]
    pub fn next(&self) -> Option<u32> {
        self.has_next().then_some(self.number + 1)
    }

    /// Previous page number, if any.
    #[must_use]
    pub const fn previous(&self) -> Option<u32> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }
}

fn num_pages(total: i64, size: u32) -> u32 {
    if total <= 0 || size == 0 {
        return 1;
    }
    let size = i64::from(size);
    u32::try_from((total + size - 1) / size).unwrap_or(u32::MAX)
}

/// REST list envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiPage<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> ApiPage<T> {
    /// Wrap `results` and build absolute `next`/`previous` links.
    ///
    /// `base` is the absolute URL of the list without a query string and
    /// `params` the other query parameters to carry along.
    #[must_use]
    pub fn new(results: Vec<T>, window: PageWindow, base: &str, params: &[(&str, String)]) -> Self {
        Self {
            count: window.total,
            next: window.next().map(|n| page_link(base, params, Some(n))),
            previous: window
                .previous()
                .map(|n| page_link(base, params, (n > 1).then_some(n))),
            results,
        }
    }
}

/// Build a list URL. Page 1 is expressed by omitting `page`.
fn page_link(base: &str, params: &[(&str, String)], page: Option<u32>) -> String {
    let mut query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect();
    if let Some(page) = page {
        query.push(format!("page={page}"));
    }
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", query.join("&"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_first_page_is_valid() {
        let window = PageWindow::resolve(None, 5, 0).unwrap();
        assert_eq!(window.number, 1);
        assert_eq!(window.num_pages(), 1);
        assert!(!window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn test_out_of_range_pages() {
        assert!(PageWindow::resolve(Some("2"), 5, 5).is_err());
        assert!(PageWindow::resolve(Some("0"), 5, 5).is_err());
        assert!(PageWindow::resolve(Some("abc"), 5, 5).is_err());
        assert!(PageWindow::resolve(Some("2"), 5, 6).is_ok());
    }

    #[test]
    fn test_last_page() {
        let window = PageWindow::resolve(Some("last"), 5, 11).unwrap();
        assert_eq!(window.number, 3);
        assert_eq!(window.offset(), 10);
        assert_eq!(window.limit(), 5);
    }

    #[test]
    fn test_api_links() {
        let window = PageWindow::resolve(Some("2"), 100, 250).unwrap();
        let page: ApiPage<u8> = ApiPage::new(
            vec![],
            window,
            "https://shop.test/api/orderlines/",
            &[("status", "2".to_string())],
        );
        assert_eq!(page.count, 250);
        assert_eq!(
            page.next.as_deref(),
            Some("https://shop.test/api/orderlines/?status=2&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("https://shop.test/api/orderlines/?status=2")
        );
    }

    #[test]
    fn test_single_page_has_no_links() {
        let window = PageWindow::resolve(None, 100, 3).unwrap();
        let page: ApiPage<u8> = ApiPage::new(vec![], window, "https://shop.test/api/orders/", &[]);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }
}

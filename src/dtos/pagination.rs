use serde::Serialize;

pub const PUBLIC_PAGE_SIZE: i64 = 9;
pub const ADMIN_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        PageRequest {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Missing, malformed or non-positive page numbers fall back to page 1.
    pub fn from_query(raw: Option<&str>, per_page: i64) -> Self {
        let page = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1);

        PageRequest::new(page, per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let pages = if total <= 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };

        Paginated {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            pages,
            has_prev: request.page > 1,
            has_next: request.page < pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            pages: self.pages,
            has_prev: self.has_prev,
            has_next: self.has_next,
        }
    }
}

/// Exact-match list filter read from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactFilter<T> {
    Any,
    Only(T),
    /// A value was given but names nothing known, so no row matches.
    Unmatched,
}

impl<T> Default for ExactFilter<T> {
    fn default() -> Self {
        ExactFilter::Any
    }
}

impl<T> ExactFilter<T> {
    /// Blank input, or the `wildcard` value when there is one, means `Any`.
    pub fn from_query(
        raw: Option<&str>,
        wildcard: Option<&str>,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Self {
        let value = match raw.map(str::trim) {
            None | Some("") => return ExactFilter::Any,
            Some(value) => value,
        };

        if wildcard == Some(value) {
            return ExactFilter::Any;
        }

        match parse(value) {
            Some(parsed) => ExactFilter::Only(parsed),
            None => ExactFilter::Unmatched,
        }
    }
}

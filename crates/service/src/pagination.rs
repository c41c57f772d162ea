//! Pagination utilities for service layer
//!
//! `PageRequest` is what callers ask for (0-based page index, page size and
//! sort orders); `Page` is one slice of a result set plus the total count.

use crate::errors::ServiceError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 2000;
/// Largest row offset a page may start at; SQL `OFFSET` is a signed 64-bit value.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    /// Parse `property` or `property,asc|desc`.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let mut parts = raw.split(',').map(str::trim);
        let property = parts.next().filter(|p| !p.is_empty())
            .ok_or_else(|| ServiceError::Validation(format!("invalid sort '{raw}'")))?;
        let direction = match parts.next() {
            None | Some("") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) => return Err(ServiceError::Validation(format!("invalid sort direction '{d}'"))),
        };
        if parts.next().is_some() {
            return Err(ServiceError::Validation(format!("invalid sort '{raw}'")));
        }
        Ok(Self { property: property.to_string(), direction })
    }
}

/// Pagination parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index
    pub page: u64,
    /// items per page
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    /// Clamp raw query values: missing or zero size falls back to the default,
    /// oversized requests are capped.
    pub fn new(page: Option<u64>, size: Option<u64>, sort: Vec<SortOrder>) -> Self {
        let size = match size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(s) => s.min(MAX_PAGE_SIZE),
        };
        Self { page: page.unwrap_or(0), size, sort }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Fail when the first row of this page lies past [`MAX_OFFSET`].
    pub fn ensure_addressable(&self) -> Result<(), ServiceError> {
        match self.page.checked_mul(self.size) {
            Some(offset) if offset <= MAX_OFFSET => Ok(()),
            _ => Err(ServiceError::Validation(format!("page {} is out of range", self.page))),
        }
    }

    /// Fail on the first sort property not in `allowed`.
    pub fn ensure_sortable(&self, allowed: &[&str]) -> Result<(), ServiceError> {
        match self.sort.iter().find(|o| !allowed.contains(&o.property.as_str())) {
            Some(o) => Err(ServiceError::Validation(format!("cannot sort by '{}'", o.property))),
            None => Ok(()),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self::new(None, None, Vec::new()) }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// 0-based index of this page
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self { content, number: request.page, size: request.size, total_elements }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 { 0 } else { self.total_elements.div_ceil(self.size) }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

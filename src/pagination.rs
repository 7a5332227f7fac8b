//! This modules defines the common functionality for paging data.

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of items on a page, at least one.
    pub per_page: u64,
}

impl PageRequest {
    /// Parse the raw `page` and `perPage` query parameters, falling back to the
    /// defaults in `config` when a parameter is missing or blank.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if a parameter is not an integer of
    /// at least one.
    pub fn from_query(
        page: Option<&str>,
        per_page: Option<&str>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            page: parse_positive("page", page, config.default_page)?,
            per_page: parse_positive("perPage", per_page, config.default_page_size)?,
        })
    }

    /// The number of items before the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// The number of pages needed to show `total` items, `per_page` at a time.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page)
}

fn parse_positive(name: &str, value: Option<&str>, default: u64) -> Result<u64, Error> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(default);
    };

    match value.parse::<u64>() {
        Ok(number) if number >= 1 => Ok(number),
        _ => Err(Error::InvalidPagination(format!(
            "{name} must be an integer of at least 1, got {value:?}"
        ))),
    }
}

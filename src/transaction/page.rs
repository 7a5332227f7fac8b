//! The page service: count the transactions matching a filter and fetch one page of them.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    db::get_count,
    month::MonthFilter,
    pagination::{PageRequest, PaginationConfig, total_pages},
};

use super::{
    core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row},
    filter::TransactionFilter,
};

/// The raw query parameters accepted by transaction listings.
///
/// Numbers are kept as strings so that invalid values produce a JSON error
/// from [PageRequest::from_query] instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    /// A month number ("03") or name ("March").
    pub month: Option<String>,
    /// Free text searched for in the title, description and price.
    pub search: Option<String>,
    /// The 1-based page number.
    pub page: Option<String>,
    /// The number of transactions per page.
    pub per_page: Option<String>,
}

impl ListingQuery {
    /// The month filter given by the `month` parameter.
    pub fn month_filter(&self) -> MonthFilter {
        MonthFilter::from_query(self.month.as_deref())
    }

    /// The full filter given by the `month` and `search` parameters.
    pub fn transaction_filter(&self) -> TransactionFilter {
        TransactionFilter::new(self.month_filter(), self.search.as_deref())
    }

    /// The page given by the `page` and `perPage` parameters.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if either parameter is invalid.
    pub fn page_request(&self, config: &PaginationConfig) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.page.as_deref(), self.per_page.as_deref(), config)
    }
}

/// One page of transactions with the pagination metadata for the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    /// The transactions on this page, in insertion order.
    pub transactions: Vec<Transaction>,
    /// The number of transactions matching the filter across all pages.
    pub total: u64,
    /// The requested page number.
    pub page: u64,
    /// The number of pages needed to show every matching transaction.
    pub total_pages: u64,
}

/// Get one page of the transactions that match `filter`.
///
/// Transactions are returned in the order they were inserted, so repeating a
/// query gives the same pages. Requesting a page past the last one gives an
/// empty page rather than an error.
///
/// # Errors
/// Returns [Error::SqlError] if the count or the page query fails.
pub fn get_transaction_page(
    filter: &TransactionFilter,
    page_request: PageRequest,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let predicate = filter.to_predicate();

    let total: u64 = connection
        .prepare(&format!(
            "SELECT COUNT(row_id) FROM sale_transaction WHERE {}",
            predicate.condition
        ))?
        .query_row(params_from_iter(predicate.params.iter()), |row| {
            get_count(row, 0)
        })?;

    let mut params = predicate.params;
    params.push(to_sql_integer(page_request.per_page));
    params.push(to_sql_integer(page_request.offset()));

    let transactions = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM sale_transaction WHERE {} \
            ORDER BY row_id ASC LIMIT ? OFFSET ?",
            predicate.condition
        ))?
        .query_map(params_from_iter(params), map_transaction_row)?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    Ok(TransactionPage {
        transactions,
        total,
        page: page_request.page,
        total_pages: total_pages(total, page_request.per_page),
    })
}

fn to_sql_integer(value: u64) -> Value {
    Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

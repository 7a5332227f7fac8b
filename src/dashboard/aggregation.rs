//! Aggregates the transactions of a month into the dashboard's statistics and charts.
//!
//! None of these views apply the search text, only the month filter.

use rusqlite::{Connection, params_from_iter};
use serde::Serialize;

use crate::{Error, db::get_count, month::MonthFilter, transaction::month_predicate};

/// Sale totals for a month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of all transactions, sold or not.
    pub total_sale_amount: f64,
    /// The number of transactions that sold.
    pub total_sold_items: u64,
    /// The number of transactions that did not sell.
    pub total_not_sold_items: u64,
}

/// One bar or slice of a chart: a label and the number of transactions it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    /// The price range or category.
    #[serde(rename = "_id")]
    pub label: String,
    /// The number of transactions with this label.
    pub count: u64,
}

impl ChartEntry {
    fn new(label: &str, count: u64) -> Self {
        Self {
            label: label.to_owned(),
            count,
        }
    }
}

/// A right-inclusive price range used by the price histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBucket {
    /// The label shown on the chart.
    pub label: &'static str,
    /// The largest price in the bucket, or `None` for the open-ended last bucket.
    pub max_price: Option<f64>,
}

/// The price histogram buckets in ascending order.
///
/// A price falls in the first bucket whose `max_price` it does not exceed, so
/// negative prices land in the first bucket.
pub const PRICE_BUCKETS: [PriceBucket; 10] = [
    PriceBucket {
        label: "0 - 100",
        max_price: Some(100.0),
    },
    PriceBucket {
        label: "101 - 200",
        max_price: Some(200.0),
    },
    PriceBucket {
        label: "201 - 300",
        max_price: Some(300.0),
    },
    PriceBucket {
        label: "301 - 400",
        max_price: Some(400.0),
    },
    PriceBucket {
        label: "401 - 500",
        max_price: Some(500.0),
    },
    PriceBucket {
        label: "501 - 600",
        max_price: Some(600.0),
    },
    PriceBucket {
        label: "601 - 700",
        max_price: Some(700.0),
    },
    PriceBucket {
        label: "701 - 800",
        max_price: Some(800.0),
    },
    PriceBucket {
        label: "801 - 900",
        max_price: Some(900.0),
    },
    PriceBucket {
        label: "901 - above",
        max_price: None,
    },
];

/// Calculates the sale totals for the transactions in `month`.
///
/// All totals are zero when no transactions match.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_statistics(month: MonthFilter, connection: &Connection) -> Result<Statistics, Error> {
    let predicate = month_predicate(month);

    connection
        .prepare(&format!(
            "SELECT
                COALESCE(SUM(price), 0.0),
                COALESCE(SUM(CASE WHEN sold THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN sold THEN 0 ELSE 1 END), 0)
            FROM sale_transaction
            WHERE {}",
            predicate.condition
        ))?
        .query_row(params_from_iter(predicate.params), |row| {
            Ok(Statistics {
                total_sale_amount: row.get(0)?,
                total_sold_items: get_count(row, 1)?,
                total_not_sold_items: get_count(row, 2)?,
            })
        })
        .map_err(|error| error.into())
}

/// Counts the transactions in `month` per price bucket.
///
/// Only buckets with at least one transaction are returned, in ascending
/// price order.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_price_histogram(
    month: MonthFilter,
    connection: &Connection,
) -> Result<Vec<ChartEntry>, Error> {
    let predicate = month_predicate(month);

    let rows = connection
        .prepare(&format!(
            "SELECT {} AS bucket, COUNT(row_id)
            FROM sale_transaction
            WHERE {}
            GROUP BY bucket
            ORDER BY bucket ASC",
            price_bucket_case(),
            predicate.condition
        ))?
        .query_map(params_from_iter(predicate.params), |row| {
            Ok((row.get::<_, i64>(0)?, get_count(row, 1)?))
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    Ok(rows
        .into_iter()
        .filter_map(|(bucket, count)| {
            usize::try_from(bucket)
                .ok()
                .and_then(|bucket| PRICE_BUCKETS.get(bucket))
                .map(|bucket| ChartEntry::new(bucket.label, count))
        })
        .collect())
}

/// Counts the transactions in `month` per category.
///
/// Categories are compared exactly and listed in the order they first
/// appear in the table.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_category_histogram(
    month: MonthFilter,
    connection: &Connection,
) -> Result<Vec<ChartEntry>, Error> {
    let predicate = month_predicate(month);

    connection
        .prepare(&format!(
            "SELECT category, COUNT(row_id)
            FROM sale_transaction
            WHERE {}
            GROUP BY category
            ORDER BY MIN(row_id) ASC",
            predicate.condition
        ))?
        .query_map(params_from_iter(predicate.params), |row| {
            Ok(ChartEntry {
                label: row.get(0)?,
                count: get_count(row, 1)?,
            })
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// A SQL `CASE` expression giving the index into [PRICE_BUCKETS] for `price`.
fn price_bucket_case() -> String {
    let mut case = String::from("CASE");
    let mut last_bucket = 0;

    for (index, bucket) in PRICE_BUCKETS.iter().enumerate() {
        match bucket.max_price {
            Some(max_price) => {
                case.push_str(&format!(" WHEN price <= {max_price:.1} THEN {index}"));
            }
            None => last_bucket = index,
        }
    }

    case.push_str(&format!(" ELSE {last_bucket} END"));
    case
}

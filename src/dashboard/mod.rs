//! Dashboard module
//!
//! Provides the month statistics, the price and category charts, and the
//! combined view that bundles them with a page of transactions.

mod aggregation;
mod combined;
mod handlers;

pub use aggregation::{
    ChartEntry, PRICE_BUCKETS, PriceBucket, Statistics, get_category_histogram,
    get_price_histogram, get_statistics,
};
pub use combined::{CombinedView, get_combined_endpoint, get_combined_view};
pub use handlers::{get_bar_chart_endpoint, get_pie_chart_endpoint, get_statistics_endpoint};

//! A JSON API for browsing and summarising sales transactions.
//!
//! Transactions are loaded from a remote seed dataset into a SQLite database.
//! The API lists pages of transactions filtered by month and search text, and
//! summarises a month as sale totals, a price range histogram and a category
//! histogram.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod extract;
mod logging;
mod month;
mod pagination;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, SeedSource};
pub use dashboard::{
    ChartEntry, CombinedView, PRICE_BUCKETS, PriceBucket, Statistics, get_category_histogram,
    get_combined_view, get_price_histogram, get_statistics,
};
pub use db::{DatabaseHandle, initialize as initialize_db};
pub use error::Error;
pub use extract::ApiQuery;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::MonthFilter;
pub use pagination::{PageRequest, PaginationConfig};
pub use routing::build_router;
pub use transaction::{
    ListingQuery, ListingState, Transaction, TransactionFilter, TransactionPage,
    count_transactions, fetch_seed_transactions, get_transaction_page, insert_transactions,
    parse_sale_date, query_transaction_page, replace_all_transactions,
};

/// The seed dataset loaded by the initialize endpoint unless another URL is configured.
pub const DEFAULT_SEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

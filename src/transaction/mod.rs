//! Sale transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its database table
//! - The filter built from the month and search query parameters
//! - The page service and the endpoint that lists pages of transactions
//! - The endpoint that replaces all transactions with the seed dataset

mod core;
mod filter;
mod page;
mod seed;
mod transactions_endpoint;

pub use core::{
    Transaction, count_transactions, create_transaction_table, insert_transactions,
    parse_sale_date, replace_all_transactions,
};
pub use filter::TransactionFilter;
pub use page::{ListingQuery, TransactionPage, get_transaction_page};
pub use seed::{fetch_seed_transactions, initialize_transactions_endpoint};
pub use transactions_endpoint::{ListingState, get_transactions_endpoint, query_transaction_page};

pub(crate) use filter::month_predicate;

//! Implements a struct that holds the state of the REST server.

use std::time::Duration;

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    db::{DatabaseHandle, initialize},
    pagination::PaginationConfig,
};

/// Where the initialize endpoint fetches the seed dataset from.
#[derive(Debug, Clone)]
pub struct SeedSource {
    /// The URL of a JSON array of transactions.
    pub url: String,
    /// The HTTP client used to fetch `url`.
    pub client: reqwest::Client,
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub database: DatabaseHandle,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The source of the data loaded by the initialize endpoint.
    pub seed_source: SeedSource,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// Every database query is abandoned after `query_timeout`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        seed_url: &str,
        pagination_config: PaginationConfig,
        query_timeout: Duration,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            database: DatabaseHandle::new(db_connection, query_timeout),
            pagination_config,
            seed_source: SeedSource {
                url: seed_url.to_owned(),
                client: reqwest::Client::new(),
            },
        })
    }
}

impl FromRef<AppState> for DatabaseHandle {
    fn from_ref(state: &AppState) -> Self {
        state.database.clone()
    }
}

impl FromRef<AppState> for SeedSource {
    fn from_ref(state: &AppState) -> Self {
        state.seed_source.clone()
    }
}

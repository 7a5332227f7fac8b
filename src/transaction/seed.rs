//! Defines the endpoint that replaces all transactions with the remote seed dataset.

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{Error, app_state::SeedSource, db::DatabaseHandle};

use super::core::{Transaction, replace_all_transactions};

/// How long replacing the transactions may take once it holds the connection.
///
/// This is longer than the query timeout since a reseed rewrites the whole table.
const RESEED_TIMEOUT: Duration = Duration::from_secs(120);

/// The message sent back after a successful reseed.
pub const INITIALIZED_MESSAGE: &str = "Database initialized successfully";

/// The body of a successful initialize response.
#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    /// A human readable confirmation.
    pub message: &'static str,
}

/// Fetch the seed dataset.
///
/// # Errors
/// Returns [Error::UpstreamFetch] if the request fails, the server does not
/// respond with a success status, or the body is not a JSON array of
/// transactions.
pub async fn fetch_seed_transactions(source: &SeedSource) -> Result<Vec<Transaction>, Error> {
    tracing::info!("fetching seed dataset from {}", source.url);

    let response = source
        .client
        .get(&source.url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|error| Error::UpstreamFetch(error.to_string()))?;

    response
        .json::<Vec<Transaction>>()
        .await
        .map_err(|error| Error::UpstreamFetch(error.to_string()))
}

/// A route handler that replaces every stored transaction with the seed dataset.
///
/// The existing records are only deleted once the dataset has been fetched and
/// decoded, and the delete and inserts are applied atomically.
pub async fn initialize_transactions_endpoint(
    State(database): State<DatabaseHandle>,
    State(seed_source): State<SeedSource>,
) -> Response {
    match reseed(&database, &seed_source).await {
        Ok(count) => {
            tracing::info!("initialized database with {count} transactions");
            Json(InitializeResponse {
                message: INITIALIZED_MESSAGE,
            })
            .into_response()
        }
        Err(error) => error.into_json_response("Error initializing database"),
    }
}

async fn reseed(database: &DatabaseHandle, seed_source: &SeedSource) -> Result<usize, Error> {
    let transactions = fetch_seed_transactions(seed_source).await?;
    let count = transactions.len();

    database
        .run_with_timeout(RESEED_TIMEOUT, move |connection| {
            replace_all_transactions(&transactions, connection)
        })
        .await?;

    Ok(count)
}

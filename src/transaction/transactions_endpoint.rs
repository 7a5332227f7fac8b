//! Defines the route handler that lists a page of transactions as JSON.

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};

use crate::{ApiQuery, AppState, Error, db::DatabaseHandle, pagination::PaginationConfig};

use super::page::{ListingQuery, TransactionPage, get_transaction_page};

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct ListingState {
    /// The database connection for querying transactions.
    pub database: DatabaseHandle,
    /// The default page and page size.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Fetch the page of transactions described by `query`.
///
/// # Errors
/// Returns [Error::InvalidPagination] for a bad `page` or `perPage`, or any
/// error from running the query.
pub async fn query_transaction_page(
    state: &ListingState,
    query: &ListingQuery,
) -> Result<TransactionPage, Error> {
    let page_request = query.page_request(&state.pagination_config)?;
    let filter = query.transaction_filter();

    state
        .database
        .run(move |connection| get_transaction_page(&filter, page_request, connection))
        .await
}

/// A route handler for one page of transactions filtered by month and search text.
pub async fn get_transactions_endpoint(
    State(state): State<ListingState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Response {
    match query_transaction_page(&state, &query).await {
        Ok(page) => Json(page).into_response(),
        Err(error) => error.into_json_response("Error fetching transactions"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use serde_json::Value;
    use time::Month;

    use crate::{
        test_utils::{get_test_connection, get_test_state, sale_in_month},
        transaction::insert_transactions,
    };

    use super::get_transactions_endpoint;

    fn get_test_server() -> TestServer {
        let conn = get_test_connection();
        let mut transactions = Vec::new();
        for i in 0..15 {
            let mut transaction = sale_in_month(100.0 + i as f64, "misc", true, Month::March);
            transaction.id = i;
            transactions.push(transaction);
        }
        let mut phone = sale_in_month(999.0, "electronics", false, Month::March);
        phone.title = "Mobile Phone".to_owned();
        transactions.push(phone);
        transactions.push(sale_in_month(5.0, "misc", true, Month::June));
        insert_transactions(&transactions, &conn).unwrap();

        let app = Router::new()
            .route("/transactions", get(get_transactions_endpoint))
            .with_state(get_test_state(conn));

        TestServer::new(app)
    }

    #[tokio::test]
    async fn uses_default_page_size() {
        let server = get_test_server();

        let response = server
            .get("/transactions")
            .add_query_param("month", "03")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["transactions"].as_array().unwrap().len(), 10);
        assert_eq!(body["total"], 16);
        assert_eq!(body["page"], 1);
        assert_eq!(body["totalPages"], 2);
    }

    #[tokio::test]
    async fn accepts_month_names() {
        let server = get_test_server();

        let body = server
            .get("/transactions")
            .add_query_param("month", "June")
            .await
            .json::<Value>();

        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn missing_month_lists_all_months() {
        let server = get_test_server();

        let body = server.get("/transactions").await.json::<Value>();

        assert_eq!(body["total"], 17);
    }

    #[tokio::test]
    async fn unparsable_month_lists_nothing() {
        let server = get_test_server();

        let response = server
            .get("/transactions")
            .add_query_param("month", "Smarch")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["total"], 0);
        assert_eq!(body["totalPages"], 0);
    }

    #[tokio::test]
    async fn searches_within_month() {
        let server = get_test_server();

        let body = server
            .get("/transactions")
            .add_query_param("month", "03")
            .add_query_param("search", "phone")
            .await
            .json::<Value>();

        assert_eq!(body["total"], 1);
        assert_eq!(body["transactions"][0]["title"], "Mobile Phone");
        assert_eq!(body["transactions"][0]["dateOfSale"], "2022-03-15T12:00:00Z");
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let server = get_test_server();

        let response = server
            .get("/transactions")
            .add_query_param("month", "03")
            .add_query_param("page", "999")
            .add_query_param("perPage", "10")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["transactions"], Value::Array(vec![]));
        assert_eq!(body["page"], 999);
        assert_eq!(body["totalPages"], 2);
    }

    #[tokio::test]
    async fn rejects_invalid_page_size() {
        let server = get_test_server();

        let response = server
            .get("/transactions")
            .add_query_param("perPage", "0")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(
            body["error"].as_str().unwrap().contains("perPage"),
            "error should name the parameter, got {body}"
        );
    }

    #[tokio::test]
    async fn repeated_query_key_returns_json_error() {
        let server = get_test_server();

        let response = server.get("/transactions?page=1&page=2").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(
            body["error"].as_str().unwrap().contains("page"),
            "error should name the parameter, got {body}"
        );
    }
}

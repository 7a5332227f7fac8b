//! The combined dashboard view, which bundles a page of transactions with the
//! statistics and both charts of a month.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    ApiQuery, Error,
    transaction::{ListingQuery, ListingState, TransactionPage, query_transaction_page},
};

use super::aggregation::{
    ChartEntry, Statistics, get_category_histogram, get_price_histogram, get_statistics,
};

/// Everything the dashboard shows for a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedView {
    /// The page of transactions matching the month and search text.
    pub transactions: TransactionPage,
    /// The sale totals for the month.
    pub statistics: Statistics,
    /// The number of transactions per price range in the month.
    pub bar_chart: Vec<ChartEntry>,
    /// The number of transactions per category in the month.
    pub pie_chart: Vec<ChartEntry>,
}

/// Run the four dashboard queries concurrently and join their results.
///
/// # Errors
/// Returns [Error::CombinedViewFailed] wrapping the first error from any of
/// the queries. No partial results are returned.
pub async fn get_combined_view(
    state: &ListingState,
    query: &ListingQuery,
) -> Result<CombinedView, Error> {
    let month = query.month_filter();

    let (transactions, statistics, bar_chart, pie_chart) = tokio::try_join!(
        query_transaction_page(state, query),
        state
            .database
            .run(move |connection| get_statistics(month, connection)),
        state
            .database
            .run(move |connection| get_price_histogram(month, connection)),
        state
            .database
            .run(move |connection| get_category_histogram(month, connection)),
    )
    .map_err(|error| Error::CombinedViewFailed(Box::new(error)))?;

    Ok(CombinedView {
        transactions,
        statistics,
        bar_chart,
        pie_chart,
    })
}

/// A route handler for the combined dashboard view.
pub async fn get_combined_endpoint(
    State(state): State<ListingState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Response {
    match get_combined_view(&state, &query).await {
        Ok(view) => Json(view).into_response(),
        Err(error) => error.into_json_response("Error fetching combined data"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use time::Month;

    use crate::{
        AppState, Error,
        dashboard::{get_bar_chart_endpoint, get_pie_chart_endpoint, get_statistics_endpoint},
        test_utils::{get_test_connection, get_test_state, sale_in_month},
        transaction::{ListingQuery, ListingState, get_transactions_endpoint, insert_transactions},
    };

    use super::{get_combined_endpoint, get_combined_view};

    fn get_test_state_with_data() -> AppState {
        let conn = get_test_connection();
        let mut transactions = Vec::new();
        for i in 0..12 {
            let month = if i % 4 == 0 { Month::May } else { Month::March };
            let category = if i % 2 == 0 { "toys" } else { "books" };
            transactions.push(sale_in_month(
                (i * 90) as f64,
                category,
                i % 3 == 0,
                month,
            ));
        }
        insert_transactions(&transactions, &conn).unwrap();

        get_test_state(conn)
    }

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route("/combined", get(get_combined_endpoint))
            .route("/transactions", get(get_transactions_endpoint))
            .route("/statistics", get(get_statistics_endpoint))
            .route("/bar-chart", get(get_bar_chart_endpoint))
            .route("/pie-chart", get(get_pie_chart_endpoint))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn combined_view_matches_individual_endpoints() {
        let server = get_test_server(get_test_state_with_data());
        let params = [("month", "March"), ("page", "2"), ("perPage", "3")];

        let mut combined_request = server.get("/combined");
        for (key, value) in params {
            combined_request = combined_request.add_query_param(key, value);
        }
        let combined = combined_request.await;
        combined.assert_status_ok();
        let combined = combined.json::<Value>();

        for (field, route) in [
            ("transactions", "/transactions"),
            ("statistics", "/statistics"),
            ("barChart", "/bar-chart"),
            ("pieChart", "/pie-chart"),
        ] {
            let mut request = server.get(route);
            for (key, value) in params {
                request = request.add_query_param(key, value);
            }
            let individual = request.await.json::<Value>();

            assert_eq!(combined[field], individual, "{field} differs from {route}");
        }
    }

    #[tokio::test]
    async fn combined_view_has_all_sections() {
        let server = get_test_server(get_test_state_with_data());

        let body = server
            .get("/combined")
            .add_query_param("month", "05")
            .await
            .json::<Value>();

        assert_eq!(body["transactions"]["total"], 3);
        assert_eq!(body["statistics"]["totalSoldItems"], 1);
        assert_eq!(body["pieChart"], json!([{ "_id": "toys", "count": 3 }]));
        assert!(body["barChart"].is_array());
    }

    #[tokio::test]
    async fn failure_returns_no_partial_results() {
        let state = get_test_state_with_data();
        state
            .database
            .run(|conn| {
                conn.execute("DROP TABLE sale_transaction", [])?;
                Ok(())
            })
            .await
            .unwrap();
        let server = get_test_server(state);

        let response = server.get("/combined").add_query_param("month", "3").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "Error fetching combined data" })
        );
    }

    #[tokio::test]
    async fn invalid_pagination_is_wrapped() {
        let state = get_test_state_with_data();
        let listing_state = ListingState {
            database: state.database.clone(),
            pagination_config: state.pagination_config.clone(),
        };
        let query = ListingQuery {
            page: Some("zero".to_owned()),
            ..Default::default()
        };

        let result = get_combined_view(&listing_state, &query).await;

        assert!(matches!(
            result,
            Err(Error::CombinedViewFailed(inner)) if matches!(*inner, Error::InvalidPagination(_))
        ));
    }
}

//! Route handlers for the statistics and chart endpoints.
//!
//! Each handler reads the `month` query parameter and ignores the others.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{ApiQuery, db::DatabaseHandle, transaction::ListingQuery};

use super::aggregation::{get_category_histogram, get_price_histogram, get_statistics};

/// A route handler for the sale totals of a month.
pub async fn get_statistics_endpoint(
    State(database): State<DatabaseHandle>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Response {
    let month = query.month_filter();

    match database
        .run(move |connection| get_statistics(month, connection))
        .await
    {
        Ok(statistics) => Json(statistics).into_response(),
        Err(error) => error.into_json_response("Error fetching statistics"),
    }
}

/// A route handler for the number of transactions per price range in a month.
pub async fn get_bar_chart_endpoint(
    State(database): State<DatabaseHandle>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Response {
    let month = query.month_filter();

    match database
        .run(move |connection| get_price_histogram(month, connection))
        .await
    {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => error.into_json_response("Error fetching bar chart data"),
    }
}

/// A route handler for the number of transactions per category in a month.
pub async fn get_pie_chart_endpoint(
    State(database): State<DatabaseHandle>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Response {
    let month = query.month_filter();

    match database
        .run(move |connection| get_category_histogram(month, connection))
        .await
    {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => error.into_json_response("Error fetching pie chart data"),
    }
}

//! Application router configuration.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, Error,
    dashboard::{
        get_bar_chart_endpoint, get_combined_endpoint, get_pie_chart_endpoint,
        get_statistics_endpoint,
    },
    endpoints,
    transaction::{get_transactions_endpoint, initialize_transactions_endpoint},
};

/// Return a router with all the app's routes.
///
/// Requests from any origin are allowed.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS_INITIALIZE,
            get(initialize_transactions_endpoint),
        )
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .route(endpoints::BAR_CHART, get(get_bar_chart_endpoint))
        .route(endpoints::PIE_CHART, get(get_pie_chart_endpoint))
        .route(endpoints::COMBINED, get(get_combined_endpoint))
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

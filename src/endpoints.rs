//! The API endpoints URIs.

/// The route that replaces all transactions with the seed dataset.
pub const TRANSACTIONS_INITIALIZE: &str = "/api/transactions/initialize";
/// The route for listing pages of transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the sale totals of a month.
pub const STATISTICS: &str = "/api/statistics";
/// The route for the price range histogram of a month.
pub const BAR_CHART: &str = "/api/bar-chart";
/// The route for the category histogram of a month.
pub const PIE_CHART: &str = "/api/pie-chart";
/// The route for the transactions, statistics and charts in one response.
pub const COMBINED: &str = "/api/combined";

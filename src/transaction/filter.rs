//! Translates the month and search query parameters into a SQL `WHERE` clause.

use rusqlite::types::Value;

use crate::{db::CONTAINS_IGNORING_CASE, month::MonthFilter};

/// The records a transaction listing should include.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionFilter {
    /// The calendar month the sale must fall in.
    pub month: MonthFilter,
    /// Free text to look for in the title, description or price.
    pub search: Option<String>,
}

/// A SQL condition with its positional parameters.
///
/// The condition uses anonymous `?` placeholders so that it can be combined
/// with further clauses by appending their parameters in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SqlPredicate {
    pub condition: String,
    pub params: Vec<Value>,
}

impl TransactionFilter {
    /// Create a filter, ignoring a blank `search`.
    pub fn new(month: MonthFilter, search: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_owned);

        Self { month, search }
    }

    /// Build the condition matching this filter.
    ///
    /// The search matches when the title or description contain the search
    /// text, ignoring case in any script, or when the search text is a number equal
    /// to the price. A search that is not a number never matches on price.
    pub(crate) fn to_predicate(&self) -> SqlPredicate {
        let mut predicate = month_predicate(self.month);

        let Some(search) = &self.search else {
            return predicate;
        };

        let mut search_conditions = vec![
            format!("{CONTAINS_IGNORING_CASE}(title, ?)"),
            format!("{CONTAINS_IGNORING_CASE}(description, ?)"),
        ];
        predicate.params.push(Value::Text(search.clone()));
        predicate.params.push(Value::Text(search.clone()));

        if let Some(price) = parse_price(search) {
            search_conditions.push("price = ?".to_owned());
            predicate.params.push(Value::Real(price));
        }

        predicate.condition = format!(
            "{} AND ({})",
            predicate.condition,
            search_conditions.join(" OR ")
        );

        predicate
    }
}

/// Build the condition matching a month of any year.
pub(crate) fn month_predicate(month: MonthFilter) -> SqlPredicate {
    match month {
        MonthFilter::Any => SqlPredicate {
            condition: "1 = 1".to_owned(),
            params: Vec::new(),
        },
        MonthFilter::Month(month) => SqlPredicate {
            condition: "sale_month = ?".to_owned(),
            params: vec![Value::Integer(u8::from(month).into())],
        },
        MonthFilter::Unmatchable => SqlPredicate {
            condition: "1 = 0".to_owned(),
            params: Vec::new(),
        },
    }
}

fn parse_price(search: &str) -> Option<f64> {
    search
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
}

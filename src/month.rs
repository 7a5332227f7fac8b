//! Parsing of the `month` query parameter into a calendar month filter.
//!
//! Every route uses the same convention: a month number (`"3"` or `"03"`)
//! or an English month name (`"March"` or `"mar"`). The year is never part
//! of the filter, so all years are pooled together for a given month.

use time::Month;

/// Restricts records to a calendar month of any year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    /// No month was given, all records match.
    #[default]
    Any,
    /// Only records sold in this month (of any year) match.
    Month(Month),
    /// A month was given but could not be understood, no records match.
    Unmatchable,
}

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

impl MonthFilter {
    /// Parse the raw `month` query parameter.
    ///
    /// A missing or blank value means no month constraint. A value that is
    /// neither a month number from 1 to 12 nor a month name gives
    /// [MonthFilter::Unmatchable] rather than an error.
    pub fn from_query(month: Option<&str>) -> Self {
        let Some(month) = month.map(str::trim).filter(|month| !month.is_empty()) else {
            return MonthFilter::Any;
        };

        match parse_month(month) {
            Some(month) => MonthFilter::Month(month),
            None => {
                tracing::debug!("could not parse month {month:?}, no records will match");
                MonthFilter::Unmatchable
            }
        }
    }
}

fn parse_month(text: &str) -> Option<Month> {
    if text.bytes().all(|byte| byte.is_ascii_digit()) {
        let number: u8 = text.parse().ok()?;
        return Month::try_from(number).ok();
    }

    let text = text.to_ascii_lowercase();

    MONTHS.into_iter().find(|month| {
        let name = month.to_string().to_ascii_lowercase();
        name == text || name[..3] == text
    })
}

use rusqlite::Connection;
use time::{Month, OffsetDateTime, macros::datetime};

use crate::{AppState, db::initialize, pagination::PaginationConfig, transaction::Transaction};

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

pub(crate) fn get_test_state(conn: Connection) -> AppState {
    AppState::new(
        conn,
        "http://127.0.0.1:9/seed.json",
        PaginationConfig::default(),
        std::time::Duration::from_secs(5),
    )
    .expect("Could not create app state")
}

pub(crate) fn sale(
    price: f64,
    category: &str,
    sold: bool,
    date_of_sale: OffsetDateTime,
) -> Transaction {
    Transaction {
        id: 1,
        title: format!("{category} item"),
        description: format!("An item from the {category} department"),
        price,
        category: category.to_owned(),
        sold,
        date_of_sale,
        image: "https://example.com/item.jpg".to_owned(),
    }
}

/// A sale on the 15th of `month` in 2022.
pub(crate) fn sale_in_month(price: f64, category: &str, sold: bool, month: Month) -> Transaction {
    let date_of_sale = datetime!(2022-01-15 12:00 UTC)
        .replace_month(month)
        .expect("the 15th is valid in every month");

    sale(price, category, sold, date_of_sale)
}

//! Defines the core data model and database functions for sale transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Deserializer, Serialize};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::{Error, db::get_count};

// ============================================================================
// MODELS
// ============================================================================

/// A product sale, i.e. an item that was listed for sale on a given date and
/// either sold or did not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The identifier from the seed dataset. Not guaranteed to be unique.
    pub id: i64,
    /// The product title.
    pub title: String,
    /// The product description.
    pub description: String,
    /// The sale price.
    pub price: f64,
    /// A free-text category label, e.g. "electronics".
    pub category: String,
    /// Whether the item sold.
    pub sold: bool,
    /// The date the transaction is recorded against, normalized to UTC.
    #[serde(
        serialize_with = "time::serde::rfc3339::serialize",
        deserialize_with = "deserialize_sale_date"
    )]
    pub date_of_sale: OffsetDateTime,
    /// The URL of the product image.
    pub image: String,
}

/// Parse a date of sale and normalize it to UTC.
///
/// Accepts RFC 3339 date-times (`2021-11-27T20:29:54+05:30`), date-times
/// without an offset which are taken to be UTC, and bare calendar dates which
/// are taken to be midnight UTC.
///
/// # Errors
/// Returns [Error::InvalidSaleDate] if `text` is in none of these formats.
pub fn parse_sale_date(text: &str) -> Result<OffsetDateTime, Error> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(date_time.to_offset(UtcOffset::UTC));
    }

    let date_time_format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(date_time) = PrimitiveDateTime::parse(text, date_time_format) {
        return Ok(date_time.assume_utc());
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| Error::InvalidSaleDate(text.to_owned()))
}

fn deserialize_sale_date<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_sale_date(&text).map_err(serde::de::Error::custom)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected by queries that return whole transactions, in the order
/// expected by [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, title, description, price, category, sold, date_of_sale, image";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS sale_transaction (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                category TEXT NOT NULL,
                sold INTEGER NOT NULL,
                date_of_sale TEXT NOT NULL,
                sale_month INTEGER NOT NULL,
                image TEXT NOT NULL
                )",
        (),
    )?;

    // Every read filters by month.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_sale_transaction_month ON sale_transaction(sale_month);",
        (),
    )?;

    Ok(())
}

/// Insert `transactions` in order, after any existing rows.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn insert_transactions(
    transactions: &[Transaction],
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement = connection.prepare(
        "INSERT INTO sale_transaction
            (id, title, description, price, category, sold, date_of_sale, sale_month, image)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;

    for transaction in transactions {
        let date_of_sale = transaction.date_of_sale.to_offset(UtcOffset::UTC);

        statement.execute((
            transaction.id,
            &transaction.title,
            &transaction.description,
            transaction.price,
            &transaction.category,
            transaction.sold,
            date_of_sale,
            u8::from(date_of_sale.month()),
            &transaction.image,
        ))?;
    }

    Ok(())
}

/// Replace the entire contents of the transaction table with `transactions`.
///
/// The delete and the inserts happen in one SQL transaction, so concurrent
/// readers see either the old or the new data set.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error, in
/// which case the table is left unchanged.
pub fn replace_all_transactions(
    transactions: &[Transaction],
    connection: &mut Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.transaction()?;

    sql_transaction.execute("DELETE FROM sale_transaction", ())?;
    insert_transactions(transactions, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(row_id) FROM sale_transaction;", [], |row| {
            get_count(row, 0)
        })
        .map_err(|error| error.into())
}

/// Map a database row selected with [TRANSACTION_COLUMNS] to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        sold: row.get(5)?,
        date_of_sale: row.get(6)?,
        image: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use time::macros::datetime;

    use crate::{
        db::initialize,
        test_utils::{get_test_connection, sale},
    };

    use super::{
        TRANSACTION_COLUMNS, count_transactions, insert_transactions, map_transaction_row,
        replace_all_transactions,
    };

    #[test]
    fn insert_then_read_back_in_order() {
        let conn = get_test_connection();
        let want = vec![
            sale(10.0, "a", true, datetime!(2022-01-01 0:00 UTC)),
            sale(20.0, "b", false, datetime!(2022-02-01 0:00 UTC)),
            sale(30.0, "c", true, datetime!(2021-03-01 12:30 UTC)),
        ];

        insert_transactions(&want, &conn).unwrap();

        let got = conn
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM sale_transaction ORDER BY row_id"
            ))
            .unwrap()
            .query_map([], map_transaction_row)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn stores_month_of_utc_date() {
        let conn = get_test_connection();
        let transaction = sale(1.0, "a", true, datetime!(2022-03-01 02:00 +5:30));

        insert_transactions(&[transaction], &conn).unwrap();

        let month: u8 = conn
            .query_row("SELECT sale_month FROM sale_transaction", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(month, 2);
    }

    #[test]
    fn replace_all_discards_previous_rows() {
        let mut conn = get_test_connection();
        let old = vec![sale(1.0, "old", true, datetime!(2022-01-01 0:00 UTC)); 5];
        let new = vec![sale(2.0, "new", false, datetime!(2022-01-01 0:00 UTC)); 3];
        insert_transactions(&old, &conn).unwrap();

        replace_all_transactions(&new, &mut conn).unwrap();

        assert_eq!(count_transactions(&conn).unwrap(), 3);
    }

    #[test]
    fn replace_all_twice_is_idempotent() {
        let mut conn = get_test_connection();
        let data = vec![
            sale(1.0, "a", true, datetime!(2022-01-01 0:00 UTC)),
            sale(2.0, "b", false, datetime!(2022-06-01 0:00 UTC)),
        ];

        replace_all_transactions(&data, &mut conn).unwrap();
        replace_all_transactions(&data, &mut conn).unwrap();

        assert_eq!(count_transactions(&conn).unwrap(), 2);
    }

    #[test]
    fn initialize_is_repeatable() {
        let conn = get_test_connection();

        initialize(&conn).expect("Could not initialize the database a second time");
    }
}

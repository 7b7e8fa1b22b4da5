//! Read-only transaction queries for the transactions page, the dashboard and the reports.

use rusqlite::Connection;

use crate::{
    Error, UserID,
    transaction::{
        Transaction,
        core::{SELECT_TRANSACTION, map_transaction_row},
    },
};

/// The total amounts of income and expenses of a user.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
}

/// Get all of a user's transactions, newest first.
///
/// Transactions on the same date are ordered by ID so the most recently
/// entered one comes first.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE \"transaction\".user_id = ?1 \
            ORDER BY date DESC, \"transaction\".id DESC"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Get the `limit` newest transactions of a user.
pub fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE \"transaction\".user_id = ?1 \
            ORDER BY date DESC, \"transaction\".id DESC LIMIT ?2"
        ))?
        .query_map((user_id.as_i64(), limit), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Find the user's transactions whose description, category name, amount or
/// date contain `query`, ignoring case.
///
/// The query is matched literally. Case is folded with Unicode rules, so
/// "café" matches "CAFÉ". An empty query matches every transaction. Results
/// are ordered like [get_transactions].
pub fn search_transactions(
    user_id: UserID,
    query: &str,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = query.trim().to_lowercase();
    let transactions = get_transactions(user_id, connection)?;

    if query.is_empty() {
        return Ok(transactions);
    }

    Ok(transactions
        .into_iter()
        .filter(|transaction| matches_search(transaction, &query))
        .collect())
}

/// Whether any searchable field of `transaction` contains the lowercase `query`.
fn matches_search(transaction: &Transaction, query: &str) -> bool {
    let category_name = transaction
        .category_name
        .as_ref()
        .map(|name| AsRef::<str>::as_ref(name).to_lowercase());

    transaction.description.to_lowercase().contains(query)
        || category_name.is_some_and(|name| name.contains(query))
        || transaction.amount.to_string().contains(query)
        || transaction.date.to_string().contains(query)
}

/// Get the total income and expenses of a user.
pub fn get_totals(user_id: UserID, connection: &Connection) -> Result<Totals, Error> {
    connection
        .query_row(
            "SELECT
                COALESCE(SUM(CASE transaction_type WHEN 'Income' THEN amount END), 0.0),
                COALESCE(SUM(CASE transaction_type WHEN 'Expense' THEN amount END), 0.0)
            FROM \"transaction\" WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| {
                Ok(Totals {
                    income: row.get(0)?,
                    expenses: row.get(1)?,
                })
            },
        )
        .map_err(Error::SqlError)
}

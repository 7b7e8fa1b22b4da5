//! Defines the core data models and database writes for transactions.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error, UserID,
    category::{CategoryName, TransactionType, get_category},
    database_id::{CategoryId, TransactionId},
    user::adjust_balance,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned in this transaction. Always positive.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category the transaction belongs to, `None` if the category was deleted.
    pub category_id: Option<CategoryId>,
    /// The current name of the category.
    pub category_name: Option<CategoryName>,
    /// Copied from the category when the transaction was created.
    pub transaction_type: TransactionType,
}

/// The validated fields for recording a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub category_id: CategoryId,
    pub description: String,
    pub date: Date,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record a transaction for `user_id` and update the user's balance.
///
/// The transaction takes its type from its category. Income adds to the
/// balance and expenses subtract from it. The insert and the balance update
/// either both happen or neither does.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if the category does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = get_category(user_id, new_transaction.category_id, connection).map_err(
        |error| match error {
            Error::NotFound => Error::CategoryNotFound,
            error => error,
        },
    )?;

    let sql_transaction = connection.unchecked_transaction()?;

    let id = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, category_id, date, description, transaction_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_transaction.amount,
                category.id,
                new_transaction.date,
                &new_transaction.description,
                category.transaction_type,
            ),
            |row| row.get(0),
        )?;

    adjust_balance(
        user_id,
        category.transaction_type.signed_amount(new_transaction.amount),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(Transaction {
        id,
        user_id,
        amount: new_transaction.amount,
        date: new_transaction.date,
        description: new_transaction.description,
        category_id: Some(category.id),
        category_name: Some(category.name),
        transaction_type: category.transaction_type,
    })
}

/// Delete a transaction owned by `user_id` and reverse its effect on the user's balance.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if the transaction does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let deleted: Option<(f64, TransactionType)> = sql_transaction
        .prepare(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2
             RETURNING amount, transaction_type",
        )?
        .query_map((transaction_id, user_id.as_i64()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .next()
        .transpose()?;

    let Some((amount, transaction_type)) = deleted else {
        return Err(Error::DeleteMissingTransaction);
    };

    adjust_balance(user_id, -transaction_type.signed_amount(amount), &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

/// Retrieve a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE \"transaction\".id = ?1 AND \"transaction\".user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)?;

    Ok(transaction)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            amount REAL NOT NULL CHECK (amount > 0),
            category_id INTEGER REFERENCES category(id) ON DELETE SET NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            transaction_type TEXT NOT NULL CHECK (transaction_type IN ('Income', 'Expense'))
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// The columns expected by [map_transaction_row], joined with the category name.
pub(crate) const SELECT_TRANSACTION: &str = "SELECT \"transaction\".id, \"transaction\".user_id, \
    amount, date, description, category_id, category.name, \"transaction\".transaction_type \
    FROM \"transaction\" \
    LEFT JOIN category ON \"transaction\".category_id = category.id";

/// Map a database row selected with [SELECT_TRANSACTION] to a Transaction.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let category_name = row
        .get::<usize, Option<String>>(6)?
        .map(|name| CategoryName::new_unchecked(&name));

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        category_id: row.get(5)?,
        category_name,
        transaction_type: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

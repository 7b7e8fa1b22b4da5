//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// The email address the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// Total income minus total expenses over all of the user's transactions.
    pub balance: f64,
}

/// The details needed to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// The email address the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// Emails are compared case-insensitively, so "Alice@Example.com" and
/// "alice@example.com" are the same account.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                password TEXT NOT NULL,
                balance REAL NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// New users start with a balance of zero.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if another user already registered `new_user.email`,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let existing_id: Option<i64> = connection
        .query_row(
            "SELECT id FROM user WHERE email = ?1",
            (new_user.email.as_str(),),
            |row| row.get(0),
        )
        .optional()?;

    if existing_id.is_some() {
        return Err(Error::DuplicateEmail);
    }

    connection.execute(
        "INSERT INTO user (first_name, last_name, email, password) VALUES (?1, ?2, ?3, ?4)",
        (
            &new_user.first_name,
            &new_user.last_name,
            new_user.email.as_str(),
            new_user.password_hash.as_ref(),
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        balance: 0.0,
    })
}

const SELECT_USER: &str = "SELECT id, first_name, last_name, email, password, balance FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(3)?;
    let raw_password_hash: String = row.get(4)?;

    // Emails are validated before they are inserted.
    let email = EmailAddress::new_unchecked(raw_email);

    Ok(User {
        id: UserID::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        balance: row.get(5)?,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database that registered with `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email"))?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Add `amount` to the cached balance of the user.
///
/// Use a negative `amount` to subtract from the balance. Callers must run
/// this in the same SQL transaction as the change to the transaction table.
///
/// Each call adds one `f64` rounding step, so after many changes the cached
/// balance can differ from [recompute_balance] in the last bits. The two
/// agree far below a cent, which is the precision balances are shown at.
///
/// # Errors
///
/// Returns a [Error::NotFound] if `user_id` does not belong to a registered user.
pub(crate) fn adjust_balance(
    user_id: UserID,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET balance = balance + ?1 WHERE id = ?2",
        (amount, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Calculate the balance of the user from their transactions, i.e., total
/// income minus total expenses.
///
/// This does not read or modify the cached balance stored on the user and is
/// intended for checking that the cached balance is correct. Compare the two
/// with a tolerance, see [adjust_balance].
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn recompute_balance(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(CASE transaction_type WHEN 'Income' THEN amount ELSE -amount END), 0.0)
            FROM \"transaction\" WHERE user_id = ?1",
            (user_id.as_i64(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

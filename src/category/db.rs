//! Database operations for categories.
//!
//! Every query is scoped to a user: a category that belongs to another user
//! is treated the same as one that does not exist.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    category::{Category, CategoryName, NewCategory},
    database_id::CategoryId,
};

/// Create a category for `user_id` and return it with its generated ID.
///
/// Category names do not need to be unique.
pub fn create_category(
    user_id: UserID,
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, planned_amount, transaction_type)
        VALUES (?1, ?2, ?3, ?4);",
        (
            user_id.as_i64(),
            new_category.name.as_ref(),
            new_category.planned_amount,
            new_category.transaction_type,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name: new_category.name,
        planned_amount: new_category.planned_amount,
        transaction_type: new_category.transaction_type,
    })
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, planned_amount, transaction_type FROM category
            WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's categories, income first, then alphabetically by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, planned_amount, transaction_type FROM category
            WHERE user_id = ?1
            ORDER BY CASE transaction_type WHEN 'Income' THEN 0 ELSE 1 END,
                name COLLATE NOCASE ASC, id ASC;",
        )?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Replace the name, planned amount and type of a category owned by `user_id`.
///
/// Transactions already recorded against the category keep the type they
/// were created with.
///
/// # Errors
///
/// Returns an [Error::UpdateMissingCategory] if the category does not exist or belongs to another user.
pub fn update_category(
    user_id: UserID,
    category_id: CategoryId,
    category: NewCategory,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, planned_amount = ?2, transaction_type = ?3
        WHERE id = ?4 AND user_id = ?5",
        (
            category.name.as_ref(),
            category.planned_amount,
            category.transaction_type,
            category_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category owned by `user_id`.
///
/// Transactions in the category are kept and become uncategorized.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingCategory] if the category does not exist or belongs to another user.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            planned_amount REAL NOT NULL CHECK (planned_amount >= 0),
            transaction_type TEXT NOT NULL CHECK (transaction_type IN ('Income', 'Expense'))
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        planned_amount: row.get(3)?,
        transaction_type: row.get(4)?,
    })
}

//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, UserID, database_id::CategoryId};

/// Whether money is coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Both transaction types, in the order they are displayed.
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }

    /// The amount of money that a transaction of `amount` adds to a balance.
    ///
    /// `amount` is assumed to be positive. Income adds to the balance and
    /// expenses subtract from it.
    pub fn signed_amount(&self, amount: f64) -> f64 {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    /// Parse "Income" or "Expense", ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.eq_ignore_ascii_case("income") {
            Ok(TransactionType::Income)
        } else if trimmed.eq_ignore_ascii_case("expense") {
            Ok(TransactionType::Expense)
        } else {
            Err(Error::InvalidTransactionType(trimmed.to_owned()))
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A budget category owned by a user, e.g. 'Groceries' with a planned
/// expense of $400.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserID,
    pub name: CategoryName,
    /// How much the user plans to earn or spend in this category.
    pub planned_amount: f64,
    pub transaction_type: TransactionType,
}

/// The validated fields for creating or updating a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub planned_amount: f64,
    pub transaction_type: TransactionType,
}

/// Form data for category creation and editing.
///
/// All fields are kept as the raw strings the user entered so that the form
/// can be shown again with the user's input if validation fails.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CategoryFormData {
    #[serde(rename = "category", default)]
    pub name: String,
    #[serde(rename = "budget", default)]
    pub planned_amount: String,
    #[serde(rename = "type", default)]
    pub transaction_type: String,
}

impl CategoryFormData {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::MissingField] if a field is empty,
    /// - [Error::InvalidAmount] if the planned amount is not a finite number of at least zero,
    /// - [Error::InvalidTransactionType] if the type is not "Income" or "Expense".
    pub fn validate(&self) -> Result<NewCategory, Error> {
        if self.planned_amount.trim().is_empty() {
            return Err(Error::MissingField("Amount"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::MissingField("Category"));
        }
        if self.transaction_type.trim().is_empty() {
            return Err(Error::MissingField("Type"));
        }

        let planned_amount = parse_planned_amount(&self.planned_amount)?;
        let transaction_type = self.transaction_type.parse()?;
        let name = CategoryName::new(&self.name)?;

        Ok(NewCategory {
            name,
            planned_amount,
            transaction_type,
        })
    }
}

impl From<&Category> for CategoryFormData {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.to_string(),
            planned_amount: format!("{:.2}", category.planned_amount),
            transaction_type: category.transaction_type.to_string(),
        }
    }
}

fn parse_planned_amount(raw_amount: &str) -> Result<f64, Error> {
    let raw_amount = raw_amount.trim();

    match raw_amount.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(Error::InvalidAmount(raw_amount.to_owned())),
    }
}


#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let category_name = CategoryName::new("\n\t \r");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_whitespace() {
        let category_name = CategoryName::new("  Rent ").unwrap();

        assert_eq!(category_name.as_ref(), "Rent");
    }
}

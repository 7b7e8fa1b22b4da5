//! The raw transaction form and its validation.

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{Error, database_id::CategoryId, transaction::NewTransaction};

/// Form data for recording a transaction.
///
/// The fields are the strings the user entered so the form can be shown
/// again if validation fails.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TransactionFormData {
    #[serde(default)]
    pub amount: String,
    /// The ID of the selected category.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

impl TransactionFormData {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::MissingField] if a field is empty,
    /// - [Error::InvalidAmount] if the amount is not a finite number greater than zero,
    /// - [Error::CategoryNotFound] if the category is not a category ID,
    /// - [Error::InvalidDate] if the date is not in the format YYYY-MM-DD.
    pub fn validate(&self) -> Result<NewTransaction, Error> {
        let amount = self.amount.trim();
        let category = self.category.trim();
        let description = self.description.trim();
        let date = self.date.trim();

        for (value, field_name) in [
            (amount, "Amount"),
            (category, "Category"),
            (description, "Description"),
            (date, "Date"),
        ] {
            if value.is_empty() {
                return Err(Error::MissingField(field_name));
            }
        }

        let amount = match amount.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && parsed > 0.0 => parsed,
            _ => return Err(Error::InvalidAmount(amount.to_owned())),
        };

        let category_id: CategoryId = category.parse().map_err(|_| Error::CategoryNotFound)?;

        let date = parse_date(date)?;

        Ok(NewTransaction {
            amount,
            category_id,
            description: description.to_owned(),
            date,
        })
    }
}

/// Parse an ISO 8601 calendar date, e.g. "2025-01-31".
fn parse_date(raw_date: &str) -> Result<Date, Error> {
    Date::parse(raw_date, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(raw_date.to_owned()))
}

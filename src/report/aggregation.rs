//! Rolls a user's transactions up by category and compares them to the planned budgets.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
    Error, UserID,
    category::{Category, TransactionType, get_categories},
    database_id::CategoryId,
    transaction::{Transaction, get_transactions},
};

/// The label for transactions whose category has been deleted.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The planned and actual amount for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// `None` for uncategorized transactions.
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub planned: f64,
    pub actual: f64,
}

impl ReportRow {
    /// How far the actual amount is above (positive) or below (negative) the plan.
    pub fn difference(&self) -> f64 {
        self.actual - self.planned
    }
}

/// The rows for either income or expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub transaction_type: TransactionType,
    pub rows: Vec<ReportRow>,
}

impl ReportSection {
    pub fn total_planned(&self) -> f64 {
        self.rows.iter().map(|row| row.planned).sum()
    }

    pub fn total_actual(&self) -> f64 {
        self.rows.iter().map(|row| row.actual).sum()
    }

    pub fn total_difference(&self) -> f64 {
        self.total_actual() - self.total_planned()
    }

    /// The actual amount per category name.
    ///
    /// Categories that share a name are added together.
    pub fn actual_by_name(&self) -> HashMap<String, f64> {
        let mut actual_by_name = HashMap::new();

        for row in &self.rows {
            *actual_by_name.entry(row.name.clone()).or_insert(0.0) += row.actual;
        }

        actual_by_name
    }
}

/// Actual against planned amounts for a user's income and expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetReport {
    pub income: ReportSection,
    pub expenses: ReportSection,
}

impl BudgetReport {
    pub fn section(&self, transaction_type: TransactionType) -> &ReportSection {
        match transaction_type {
            TransactionType::Income => &self.income,
            TransactionType::Expense => &self.expenses,
        }
    }

    /// Actual income minus actual expenses.
    pub fn net_actual(&self) -> f64 {
        self.income.total_actual() - self.expenses.total_actual()
    }

    /// Planned income minus planned expenses.
    pub fn net_planned(&self) -> f64 {
        self.income.total_planned() - self.expenses.total_planned()
    }
}

/// Build the budget report for `categories` from `transactions`.
///
/// Each transaction is counted once, under its own stored type and its
/// category. Every category gets a row in the section for its type. Actual
/// amounts that do not match a category of the same type, because the
/// category was deleted or its type was changed, get an extra row with a
/// planned amount of zero.
pub fn build_report(categories: &[Category], transactions: &[Transaction]) -> BudgetReport {
    let mut actual: HashMap<(TransactionType, Option<CategoryId>), f64> = HashMap::new();

    for transaction in transactions {
        *actual
            .entry((transaction.transaction_type, transaction.category_id))
            .or_insert(0.0) += transaction.amount;
    }

    let mut build_section = |transaction_type: TransactionType| {
        let mut rows: Vec<ReportRow> = categories
            .iter()
            .filter(|category| category.transaction_type == transaction_type)
            .map(|category| ReportRow {
                category_id: Some(category.id),
                name: category.name.to_string(),
                planned: category.planned_amount,
                actual: actual
                    .remove(&(transaction_type, Some(category.id)))
                    .unwrap_or(0.0),
            })
            .collect();

        // Categories whose type changed after their transactions were recorded.
        for category in categories
            .iter()
            .filter(|category| category.transaction_type != transaction_type)
        {
            if let Some(amount) = actual.remove(&(transaction_type, Some(category.id))) {
                rows.push(ReportRow {
                    category_id: Some(category.id),
                    name: category.name.to_string(),
                    planned: 0.0,
                    actual: amount,
                });
            }
        }

        let uncategorized: f64 = actual
            .iter()
            .filter(|((row_type, _), _)| *row_type == transaction_type)
            .map(|(_, amount)| amount)
            .sum();

        if actual.keys().any(|(row_type, _)| *row_type == transaction_type) {
            rows.push(ReportRow {
                category_id: None,
                name: UNCATEGORIZED_LABEL.to_owned(),
                planned: 0.0,
                actual: uncategorized,
            });
        }

        ReportSection {
            transaction_type,
            rows,
        }
    };

    let income = build_section(TransactionType::Income);
    let expenses = build_section(TransactionType::Expense);

    BudgetReport { income, expenses }
}

/// Load the user's categories and transactions and build their budget report.
pub fn get_budget_report(user_id: UserID, connection: &Connection) -> Result<BudgetReport, Error> {
    let categories = get_categories(user_id, connection)?;
    let transactions = get_transactions(user_id, connection)?;

    Ok(build_report(&categories, &transactions))
}

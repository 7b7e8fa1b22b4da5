//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the functions that record and delete
//!   transactions while keeping the user's balance in step
//! - Queries for listing, searching and totalling transactions
//! - View handlers for transaction-related web pages

mod core;
mod create_page;
mod delete_endpoint;
mod form;
mod query;
mod transactions_page;

pub use core::{
    NewTransaction, Transaction, add_transaction, create_transaction_table, delete_transaction,
    get_transaction,
};
pub use create_page::{add_transaction_endpoint, get_add_transaction_page};
pub use delete_endpoint::delete_transaction_endpoint;
pub use form::TransactionFormData;
pub use query::{Totals, get_recent_transactions, get_totals, get_transactions, search_transactions};
pub use transactions_page::{get_transactions_page, search_transactions_endpoint};

//! Dashboard module
//!
//! Provides an overview page showing the user's balance, their income and
//! expense totals, and their most recent transactions.

mod cards;
mod handlers;

pub use handlers::get_dashboard_page;

//! The budget report comparing what a user planned with what they recorded.
//!
//! The report itself is built in [aggregation]; the master table and the
//! notifications page are two views of it.

mod aggregation;
mod master_table;
mod notifications;

pub use aggregation::{BudgetReport, ReportSection, get_budget_report};
pub use master_table::get_master_table_page;
pub use notifications::get_notifications_page;

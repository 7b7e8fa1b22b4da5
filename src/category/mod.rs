//! Budget categories: what a user plans to earn or spend, grouped as income or expenses.

mod budgets_page;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;

pub use budgets_page::get_budgets_page;
pub use create::{create_category_endpoint, get_create_category_page};
pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_category,
    update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryFormData, CategoryName, NewCategory, TransactionType};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::get_categories_page;

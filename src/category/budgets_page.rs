//! The budgets page listing the planned amount of each category grouped by type.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{Category, TransactionType, get_categories},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        amount_color_class, base, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the planned income and expenses of the user.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(budgets_view(&categories).into_response())
}

fn planned_total(categories: &[Category], transaction_type: TransactionType) -> f64 {
    categories
        .iter()
        .filter(|category| category.transaction_type == transaction_type)
        .map(|category| category.planned_amount)
        .sum()
}

fn budget_section(categories: &[Category], transaction_type: TransactionType) -> Markup {
    let rows = categories
        .iter()
        .filter(|category| category.transaction_type == transaction_type)
        .collect::<Vec<_>>();
    let total = planned_total(categories, transaction_type);
    let section_id = format!("{}-budgets", transaction_type.as_str().to_lowercase());

    html! {
        section id=(section_id) class="space-y-2"
        {
            h2 class="text-lg font-semibold" { (transaction_type) }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Planned" }
                    }
                }

                tbody
                {
                    @for category in &rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (category.name) }
                            td class={(TABLE_CELL_STYLE) " text-right tabular-nums"}
                            {
                                (format_currency(category.planned_amount))
                            }
                        }
                    }

                    @if rows.is_empty() {
                        tr
                        {
                            td colspan="2" class="px-6 py-4 text-center"
                            {
                                "No " (transaction_type.as_str().to_lowercase()) " categories."
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                        td class={(TABLE_CELL_STYLE) " text-right tabular-nums"}
                        {
                            (format_currency(total))
                        }
                    }
                }
            }
        }
    }
}

fn budgets_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let planned_surplus = planned_total(categories, TransactionType::Income)
        - planned_total(categories, TransactionType::Expense);

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-6 lg:max-w-3xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(endpoints::CATEGORIES_VIEW) class=(LINK_STYLE) { "Manage Categories" }
                }

                @for transaction_type in TransactionType::ALL {
                    (budget_section(categories, transaction_type))
                }

                p id="planned-surplus" class="text-base font-semibold"
                {
                    "Planned surplus: "
                    span class=(amount_color_class(planned_surplus))
                    {
                        (format_currency(planned_surplus))
                    }
                }
            }
        }
    };

    base("Budgets", &[], &content)
}

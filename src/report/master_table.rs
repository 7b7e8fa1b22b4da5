//! The master table comparing actual income and expenses with the planned budgets.

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
    category::TransactionType,
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        amount_color_class, base, format_currency,
    },
    navigation::NavBar,
    report::{BudgetReport, ReportSection, get_budget_report},
};

/// The state needed for the master table page.
#[derive(Debug, Clone)]
pub struct MasterTableState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MasterTableState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget report for the user.
pub async fn get_master_table_page(
    State(state): State<MasterTableState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let report = get_budget_report(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not build budget report: {error}"))?;

    Ok(master_table_view(&report).into_response())
}

/// The colour for a difference, where a good result is green.
///
/// Earning more than planned is good, spending more than planned is not.
fn difference_color_class(transaction_type: TransactionType, difference: f64) -> &'static str {
    match transaction_type {
        TransactionType::Income => amount_color_class(difference),
        TransactionType::Expense => amount_color_class(-difference),
    }
}

fn report_section(section: &ReportSection) -> Markup {
    let transaction_type = section.transaction_type;
    let section_id = format!("{}-report", transaction_type.as_str().to_lowercase());
    let amount_cell = format!("{TABLE_CELL_STYLE} text-right tabular-nums");

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
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Actual" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Difference" }
                    }
                }

                tbody
                {
                    @for row in &section.rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (row.name) }
                            td class=(amount_cell) { (format_currency(row.planned)) }
                            td class=(amount_cell) { (format_currency(row.actual)) }
                            td class={(amount_cell) " " (difference_color_class(transaction_type, row.difference()))}
                            {
                                (format_currency(row.difference()))
                            }
                        }
                    }

                    @if section.rows.is_empty() {
                        tr
                        {
                            td colspan="4" class="px-6 py-4 text-center"
                            {
                                "No " (transaction_type.as_str().to_lowercase()) " recorded or planned."
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                        td class=(amount_cell) { (format_currency(section.total_planned())) }
                        td class=(amount_cell) { (format_currency(section.total_actual())) }
                        td class=(amount_cell) { (format_currency(section.total_difference())) }
                    }
                }
            }
        }
    }
}

fn master_table_view(report: &BudgetReport) -> Markup {
    let nav_bar = NavBar::new(endpoints::MASTER_TABLE_VIEW).into_html();
    let net_actual = report.net_actual();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-6 lg:max-w-4xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Master Table" }

                    a href=(endpoints::NOTIFICATIONS_VIEW) class=(LINK_STYLE) { "View Notifications" }
                }

                @for transaction_type in TransactionType::ALL {
                    (report_section(report.section(transaction_type)))
                }

                dl class="grid grid-cols-2 gap-2 max-w-sm text-base"
                {
                    dt class="font-semibold" { "Planned net" }
                    dd id="net-planned" class="text-right tabular-nums"
                    {
                        (format_currency(report.net_planned()))
                    }

                    dt class="font-semibold" { "Actual net" }
                    dd id="net-actual" class={"text-right tabular-nums " (amount_color_class(net_actual))}
                    {
                        (format_currency(net_actual))
                    }
                }
            }
        }
    };

    base("Master Table", &[], &content)
}

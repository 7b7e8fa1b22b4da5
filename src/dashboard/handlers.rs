//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, User, UserID,
    category::TransactionType,
    dashboard::cards::summary_cards_view,
    endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_GREEN_STYLE, TABLE_CELL_RED_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    transaction::{Totals, Transaction, get_recent_transactions, get_totals},
    user::get_user_by_id,
};

/// How many of the latest transactions to show on the dashboard.
const RECENT_TRANSACTION_COUNT: u32 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the user's balance and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;
    let totals = get_totals(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transaction totals: {error}"))?;
    let recent_transactions =
        get_recent_transactions(user_id, RECENT_TRANSACTION_COUNT, &connection)
            .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?;

    Ok(dashboard_view(&user, &totals, &recent_transactions).into_response())
}

fn recent_transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                }
            }

            tbody
            {
                @for transaction in transactions {
                    @let (amount_style, signed_amount) = match transaction.transaction_type {
                        TransactionType::Income => (TABLE_CELL_GREEN_STYLE, transaction.amount),
                        TransactionType::Expense => (TABLE_CELL_RED_STYLE, -transaction.amount),
                    };

                    tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                    {
                        td class=(TABLE_CELL_STYLE) { (transaction.date) }
                        td class=(TABLE_CELL_STYLE) { (transaction.description) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @match &transaction.category_name {
                                Some(name) => { (name) }
                                None => { span class="italic" { "Uncategorized" } }
                            }
                        }
                        td class={(TABLE_CELL_STYLE) " text-right tabular-nums " (amount_style)}
                        {
                            (format_currency(signed_amount))
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(user: &User, totals: &Totals, recent_transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let add_transaction_link = link(endpoints::ADD_TRANSACTION, "add a transaction");
    let all_transactions_link = link(endpoints::TRANSACTIONS_VIEW, "View all transactions");

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class={"space-y-6 max-w-screen-xl " (PAGE_CONTAINER_STYLE)}
        {
            h1 class="text-xl font-bold" { "Welcome, " (user.first_name) }

            (summary_cards_view(user.balance, totals))

            section id="recent-transactions" class="w-full space-y-2"
            {
                div class="flex justify-between items-baseline"
                {
                    h2 class="text-lg font-semibold" { "Recent Transactions" }

                    @if !recent_transactions.is_empty() {
                        (all_transactions_link)
                    }
                }

                @if recent_transactions.is_empty() {
                    p
                    {
                        "Nothing here yet. Once you " (add_transaction_link)
                        " it will show up here."
                    }
                } @else {
                    div class="overflow-x-auto dark:bg-gray-800"
                    {
                        (recent_transactions_table(recent_transactions))
                    }
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}

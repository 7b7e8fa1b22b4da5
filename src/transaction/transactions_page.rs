//! The page listing a user's transactions, with a search box.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    category::TransactionType,
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_GREEN_STYLE, TABLE_CELL_RED_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    transaction::{Transaction, get_transactions, search_transactions},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The search box on the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub searchfield: String,
}

/// Render all of the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    Ok(transactions_view(&transactions, "").into_response())
}

/// Render the user's transactions matching the submitted search query.
pub async fn search_transactions_endpoint(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Form(search): Form<SearchForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = search_transactions(user_id, &search.searchfield, &connection)
        .inspect_err(|error| tracing::error!("could not search transactions: {error}"))?;

    Ok(transactions_view(&transactions, &search.searchfield).into_response())
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);
    let (amount_style, signed_amount) = match transaction.transaction_type {
        TransactionType::Income => (TABLE_CELL_GREEN_STYLE, transaction.amount),
        TransactionType::Expense => (TABLE_CELL_RED_STYLE, -transaction.amount),
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE)
            {
                @match &transaction.category_name {
                    Some(name) => {
                        span class=(BADGE_STYLE) { (name) }
                    }
                    None => {
                        span class="italic" { "Uncategorized" }
                    }
                }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.transaction_type) }
            td class={(TABLE_CELL_STYLE) " text-right tabular-nums " (amount_style)}
            {
                (format_currency(signed_amount))
            }
            td class=(TABLE_CELL_STYLE)
            {
                a
                    href=(delete_url)
                    class=(BUTTON_DELETE_STYLE)
                    onclick="return confirm('Are you sure you want to delete this transaction?');"
                {
                    "Delete"
                }
            }
        }
    }
}

fn transactions_view(transactions: &[Transaction], search_query: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::ADD_TRANSACTION) class=(LINK_STYLE) { "Add Transaction" }
                }

                form
                    method="post"
                    action=(endpoints::TRANSACTIONS_VIEW)
                    class="flex gap-2"
                {
                    input
                        type="search"
                        name="searchfield"
                        id="searchfield"
                        placeholder="Search description, category, amount or date"
                        value=(search_query)
                        class=(FORM_TEXT_INPUT_STYLE);

                    button type="submit" class={(BUTTON_PRIMARY_STYLE) " max-w-32"} { "Search" }
                }

                div class="overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td colspan="6" class="px-6 py-4 text-center"
                                    {
                                        @if search_query.trim().is_empty() {
                                            "No transactions recorded yet."
                                        } @else {
                                            "No transactions match \"" (search_query.trim()) "\"."
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        User,
        category::{CategoryName, NewCategory, TransactionType, create_category},
        endpoints,
        test_utils::{
            assert_form_action, assert_valid_html, insert_test_user, must_get_form,
            parse_html_document, test_connection,
        },
        transaction::{NewTransaction, add_transaction},
    };

    use super::{
        SearchForm, TransactionsViewState, get_transactions_page, search_transactions_endpoint,
    };

    fn get_test_state() -> (TransactionsViewState, User) {
        let connection = test_connection();
        let user = insert_test_user(&connection, "test@example.com");
        let groceries = create_category(
            user.id,
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                planned_amount: 400.0,
                transaction_type: TransactionType::Expense,
            },
            &connection,
        )
        .unwrap();

        for (amount, description, date) in [
            (12.5, "Bread and milk", date!(2025 - 01 - 01)),
            (80.0, "Weekly shop", date!(2025 - 01 - 08)),
        ] {
            add_transaction(
                user.id,
                NewTransaction {
                    amount,
                    category_id: groceries.id,
                    description: description.to_owned(),
                    date,
                },
                &connection,
            )
            .unwrap();
        }

        (
            TransactionsViewState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    fn row_descriptions(html: &Html) -> Vec<String> {
        let row_selector = Selector::parse("tbody tr[data-transaction-id]").unwrap();
        let cell_selector = Selector::parse("td").unwrap();

        html.select(&row_selector)
            .map(|row| {
                row.select(&cell_selector)
                    .nth(1)
                    .expect("row is missing the description cell")
                    .text()
                    .collect::<String>()
            })
            .collect()
    }

    #[tokio::test]
    async fn lists_transactions_newest_first() {
        let (state, user) = get_test_state();

        let response = get_transactions_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_form_action(&must_get_form(&html), endpoints::TRANSACTIONS_VIEW);
        assert_eq!(row_descriptions(&html), ["Weekly shop", "Bread and milk"]);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("-$80.00"), "expense should be shown as negative");
    }

    #[tokio::test]
    async fn search_filters_transactions() {
        let (state, user) = get_test_state();

        let response = search_transactions_endpoint(
            State(state),
            Extension(user.id),
            Form(SearchForm {
                searchfield: "MILK".to_owned(),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(row_descriptions(&html), ["Bread and milk"]);

        let search_input = html
            .select(&Selector::parse("input[name=searchfield]").unwrap())
            .next()
            .unwrap();
        assert_eq!(search_input.value().attr("value"), Some("MILK"));
    }

    #[tokio::test]
    async fn search_without_matches_shows_message() {
        let (state, user) = get_test_state();

        let response = search_transactions_endpoint(
            State(state),
            Extension(user.id),
            Form(SearchForm {
                searchfield: "rent".to_owned(),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert!(row_descriptions(&html).is_empty());
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No transactions match \"rent\"."));
    }
}

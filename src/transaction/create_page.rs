//! Defines the page and endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, UserID,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        amount_input, base, dollar_input_styles, form_error, labelled_input, link,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{add_transaction, form::TransactionFormData},
};

fn add_transaction_view(
    form_data: &TransactionFormData,
    categories: &[Category],
    error_message: Option<&str>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::ADD_TRANSACTION).into_html();
    let selected_category = form_data.category.trim();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                method="post"
                action=(endpoints::ADD_TRANSACTION)
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (amount_input("Amount", "amount", &form_data.amount))

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    select
                        name="category"
                        id="category"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" disabled selected[selected_category.is_empty()]
                        {
                            "Choose a category"
                        }

                        @for category in categories {
                            option
                                value=(category.id)
                                selected[selected_category == category.id.to_string()]
                            {
                                (category.name) " (" (category.transaction_type) ")"
                            }
                        }
                    }

                    @if categories.is_empty() {
                        span class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "You have no categories yet. "
                            (link(endpoints::CREATE_CATEGORY, "Create a category"))
                            " before recording transactions."
                        }
                    }
                }

                (labelled_input("Description", "description", "text", &form_data.description, None))

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        required
                        value=(form_data.date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (form_error(error_message))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Add Transaction"
                }
            }
        }
    };

    base("Add Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the add transaction page and endpoint.
#[derive(Debug, Clone)]
pub struct AddTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AddTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn today(local_timezone: &str) -> Result<Date, Error> {
    let local_offset = get_local_offset(local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {local_timezone}");
        Error::InvalidTimezoneError(local_timezone.to_owned())
    })?;

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

/// Renders the page for recording a transaction with the date set to today.
pub async fn get_add_transaction_page(
    State(state): State<AddTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_categories(user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for new transaction page: {error}")
        })?
    };

    let today = today(&state.local_timezone)?;
    let form_data = TransactionFormData {
        date: today.to_string(),
        ..Default::default()
    };

    Ok(add_transaction_view(&form_data, &categories, None).into_response())
}

/// Record a transaction and redirect to the transactions page.
///
/// Invalid input, including a category the user does not own, re-renders the
/// form with the user's input and an error message.
pub async fn add_transaction_endpoint(
    State(state): State<AddTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<TransactionFormData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let result = form_data
        .validate()
        .and_then(|new_transaction| add_transaction(user_id, new_transaction, &connection));

    match result {
        Ok(transaction) => {
            tracing::debug!("User {user_id} added transaction {}", transaction.id);
            Ok(Redirect::to(endpoints::TRANSACTIONS_VIEW).into_response())
        }
        Err(error) if error.is_validation_error() || error == Error::CategoryNotFound => {
            let categories = get_categories(user_id, &connection)?;

            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                add_transaction_view(&form_data, &categories, Some(&error.to_string())),
            )
                .into_response())
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while adding a transaction: {error}");
            Err(error)
        }
    }
}

#[cfg(test)]
mod add_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        category::{CategoryName, NewCategory, TransactionType, create_category},
        endpoints,
        test_utils::{
            assert_content_type, assert_form_action, assert_form_input,
            assert_form_input_with_value, assert_form_submit_button, assert_valid_html,
            insert_test_user, must_get_form, parse_html_document, test_connection,
        },
    };

    use super::{AddTransactionState, get_add_transaction_page};

    #[tokio::test]
    async fn page_shows_form_with_categories_and_today() {
        let connection = test_connection();
        let user = insert_test_user(&connection, "test@example.com");
        let category = create_category(
            user.id,
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                planned_amount: 400.0,
                transaction_type: TransactionType::Expense,
            },
            &connection,
        )
        .unwrap();
        let state = AddTransactionState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_add_transaction_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_form_action(&form, endpoints::ADD_TRANSACTION);
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "description", "text");
        let today = OffsetDateTime::now_utc().date().to_string();
        assert_form_input_with_value(&form, "date", "date", &today);
        assert_form_submit_button(&form);

        let options = form
            .select(&Selector::parse("select[name=category] option[value]").unwrap())
            .filter_map(|option| option.value().attr("value"))
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>();
        assert_eq!(options, [category.id.to_string()]);
    }

    #[tokio::test]
    async fn page_links_to_category_creation_without_categories() {
        let connection = test_connection();
        let user = insert_test_user(&connection, "test@example.com");
        let state = AddTransactionState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_add_transaction_page(State(state), Extension(user.id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let create_link = Selector::parse(&format!("a[href='{}']", endpoints::CREATE_CATEGORY))
            .unwrap();
        assert!(document.select(&create_link).next().is_some());
    }
}

#[cfg(test)]
mod add_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        Error, UserID,
        category::{Category, CategoryName, NewCategory, TransactionType, create_category},
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_see_other,
            insert_test_user, must_get_form, parse_html_document, test_connection,
        },
        transaction::{form::TransactionFormData, get_transactions},
        user::get_user_by_id,
    };

    use super::{AddTransactionState, add_transaction_endpoint};

    fn get_test_state() -> (AddTransactionState, UserID, Category) {
        let connection = test_connection();
        let user = insert_test_user(&connection, "test@example.com");
        let category = create_category(
            user.id,
            NewCategory {
                name: CategoryName::new_unchecked("Salary"),
                planned_amount: 1000.0,
                transaction_type: TransactionType::Income,
            },
            &connection,
        )
        .unwrap();

        (
            AddTransactionState {
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
            category,
        )
    }

    fn form(amount: &str, category: &str) -> TransactionFormData {
        TransactionFormData {
            amount: amount.to_owned(),
            category: category.to_owned(),
            description: "Pay day".to_owned(),
            date: "2025-06-30".to_owned(),
        }
    }

    #[tokio::test]
    async fn adds_transaction_and_updates_balance() {
        let (state, user_id, category) = get_test_state();

        let response = add_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("100", &category.id.to_string())),
        )
        .await
        .unwrap();

        assert_see_other(&response, endpoints::TRANSACTIONS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions(user_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].description, "Pay day");
        assert_eq!(get_user_by_id(user_id, &connection).unwrap().balance, 100.0);
    }

    #[tokio::test]
    async fn invalid_amount_rerenders_form_with_input() {
        let (state, user_id, category) = get_test_state();

        let response = add_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("0", &category.id.to_string())),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let document = parse_html_document(response).await;
        let form = must_get_form(&document);
        assert_form_error_message(&form, &Error::InvalidAmount("0".to_owned()).to_string());
        assert_form_input_with_value(&form, "description", "text", "Pay day");
        assert_form_input_with_value(&form, "date", "date", "2025-06-30");

        let connection = state.db_connection.lock().unwrap();
        assert!(get_transactions(user_id, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_users_category_is_rejected() {
        let (state, _, category) = get_test_state();
        let other_user = insert_test_user(&state.db_connection.lock().unwrap(), "other@example.com");

        let response = add_transaction_endpoint(
            State(state.clone()),
            Extension(other_user.id),
            Form(form("100", &category.id.to_string())),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let document = parse_html_document(response).await;
        assert_form_error_message(
            &must_get_form(&document),
            &Error::CategoryNotFound.to_string(),
        );
    }
}

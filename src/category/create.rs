//! Category creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use maud::Markup;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{
        create_category,
        domain::CategoryFormData,
        form::{category_form, category_form_page},
    },
    endpoints,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page.
pub async fn get_create_category_page() -> Response {
    create_category_view(&CategoryFormData::default(), None).into_response()
}

/// Handle category creation form submission.
///
/// Invalid input re-renders the form with the user's input and an error message.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let new_category = match form_data.validate() {
        Ok(new_category) => new_category,
        Err(error) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                create_category_view(&form_data, Some(&error.to_string())),
            )
                .into_response();
        }
    };

    let result = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| create_category(user_id, new_category, &connection));

    match result {
        Ok(category) => {
            tracing::debug!("User {user_id} created category {}", category.id);
            Redirect::to(endpoints::CATEGORIES_VIEW).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            error.into_response()
        }
    }
}

fn create_category_view(form_data: &CategoryFormData, error_message: Option<&str>) -> Markup {
    let form = category_form(
        endpoints::CREATE_CATEGORY,
        form_data,
        error_message,
        "Create Category",
    );

    category_form_page("Create Category", endpoints::CREATE_CATEGORY, &form)
}

#[cfg(test)]
mod create_category_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_action, assert_form_input, assert_form_select,
            assert_form_submit_button_with_text, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::get_create_category_page;

    #[tokio::test]
    async fn render_page() {
        let response = get_create_category_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_form_action(&form, endpoints::CREATE_CATEGORY);
        assert_form_input(&form, "category", "text");
        assert_form_input(&form, "budget", "number");
        assert_form_select(&form, "type", &["Income", "Expense"]);
        assert_form_submit_button_with_text(&form, "Create Category");
    }
}

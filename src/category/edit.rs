//! Category editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use maud::Markup;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{
        domain::CategoryFormData,
        form::{category_form, category_form_page},
        get_category, update_category,
    },
    database_id::CategoryId,
    endpoints,
};

/// The state needed for the edit category page and endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page pre-filled with the category's current values.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(user_id, category_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve category {category_id}: {error}");
        }
    })?;

    Ok(edit_category_view(category_id, &CategoryFormData::from(&category), None).into_response())
}

/// Handle category update form submission.
///
/// Categories that do not exist or belong to another user give a 404 before
/// the form is looked at.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    if let Err(error) = get_category(user_id, category_id, &connection) {
        if error != Error::NotFound {
            tracing::error!("Failed to retrieve category {category_id}: {error}");
        }
        return error.into_response();
    }

    let category = match form_data.validate() {
        Ok(category) => category,
        Err(error) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                edit_category_view(category_id, &form_data, Some(&error.to_string())),
            )
                .into_response();
        }
    };

    match update_category(user_id, category_id, category, &connection) {
        Ok(()) => Redirect::to(endpoints::CATEGORIES_VIEW).into_response(),
        Err(Error::UpdateMissingCategory) => Error::UpdateMissingCategory.into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_response()
        }
    }
}

fn edit_category_view(
    category_id: CategoryId,
    form_data: &CategoryFormData,
    error_message: Option<&str>,
) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY, category_id);
    let form = category_form(&edit_endpoint, form_data, error_message, "Save Changes");

    category_form_page("Edit Category", &edit_endpoint, &form)
}

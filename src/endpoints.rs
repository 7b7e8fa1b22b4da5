//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/edit_category/{category_id}', use [format_endpoint].

/// The landing page.
pub const ROOT: &str = "/";
/// The page for logged in users showing their balance and recent activity.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for getting the log-in page.
pub const LOG_IN_VIEW: &str = "/form_login";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The route for getting the registration page and registering a user.
pub const REGISTER: &str = "/register";
/// The page for creating a new transaction.
pub const ADD_TRANSACTION: &str = "/add_transaction";
/// The page for displaying and searching a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/view_transactions";
/// The route for deleting a transaction.
pub const DELETE_TRANSACTION: &str = "/delete_transaction/{transaction_id}";
/// The page for creating a new category.
pub const CREATE_CATEGORY: &str = "/create_category";
/// The page for listing a user's categories.
pub const CATEGORIES_VIEW: &str = "/view_categories";
/// The page for editing an existing category.
pub const EDIT_CATEGORY: &str = "/edit_category/{category_id}";
/// The route for deleting a category.
pub const DELETE_CATEGORY: &str = "/delete_category/{category_id}";
/// The page listing the planned amount of each category.
pub const BUDGETS_VIEW: &str = "/view_budgets";
/// The page comparing actual totals against planned budgets.
pub const MASTER_TABLE_VIEW: &str = "/view_master_table";
/// The page listing budget notices.
pub const NOTIFICATIONS_VIEW: &str = "/view_notifications";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/edit_category/{category_id}', '{category_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::REGISTER);
        assert_endpoint_is_valid_uri(endpoints::ADD_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::DELETE_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::CREATE_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::DELETE_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::MASTER_TABLE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NOTIFICATIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint(endpoints::DELETE_TRANSACTION, 1);

        assert_eq!(formatted_path, "/delete_transaction/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}

//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, get_log_in_page, get_log_out, get_register_page, post_log_in, register_user},
    category::{
        create_category_endpoint, delete_category_endpoint, get_budgets_page,
        get_categories_page, get_create_category_page, get_edit_category_page,
        update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    landing::get_landing_page,
    not_found::get_404_not_found,
    report::{get_master_table_page, get_notifications_page},
    transaction::{
        add_transaction_endpoint, delete_transaction_endpoint, get_add_transaction_page,
        get_transactions_page, search_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_landing_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::REGISTER,
            get(get_register_page).post(register_user),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::ADD_TRANSACTION,
            get(get_add_transaction_page).post(add_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_VIEW,
            get(get_transactions_page).post(search_transactions_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            get(delete_transaction_endpoint),
        )
        .route(
            endpoints::CREATE_CATEGORY,
            get(get_create_category_page).post(create_category_endpoint),
        )
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(
            endpoints::EDIT_CATEGORY,
            get(get_edit_category_page).post(update_category_endpoint),
        )
        .route(endpoints::DELETE_CATEGORY, get(delete_category_endpoint))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::MASTER_TABLE_VIEW, get(get_master_table_page))
        .route(endpoints::NOTIFICATIONS_VIEW, get(get_notifications_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        AppState, User,
        auth::SESSION_COOKIE,
        category::get_categories,
        endpoints::{self, format_endpoint},
        test_utils::{TEST_PASSWORD, insert_test_user},
        transaction::get_transactions,
        user::get_user_by_id,
    };

    use super::build_router;

    fn get_test_server() -> (TestServer, AppState) {
        let connection = Connection::open_in_memory().expect("could not open database");
        let state = AppState::new(connection, "router test secret", "Etc/UTC")
            .expect("could not create app state");
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        (server, state)
    }

    fn add_user(state: &AppState, email: &str) -> User {
        let connection = state.db_connection.lock().unwrap();
        insert_test_user(&connection, email)
    }

    async fn log_in(server: &TestServer, email: &str) -> Cookie<'static> {
        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("email", email), ("password", TEST_PASSWORD)])
            .await;

        response.assert_status_see_other();
        response.cookie(SESSION_COOKIE)
    }

    #[tokio::test]
    async fn protected_routes_redirect_to_log_in_without_session() {
        let (server, _) = get_test_server();

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::ADD_TRANSACTION,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::CREATE_CATEGORY,
            endpoints::BUDGETS_VIEW,
            endpoints::MASTER_TABLE_VIEW,
            endpoints::NOTIFICATIONS_VIEW,
        ] {
            let response = server.get(endpoint).await;

            response.assert_status_see_other();
            let location = response.header("location");
            let location = location.to_str().unwrap();
            assert!(
                location.starts_with(endpoints::LOG_IN_VIEW),
                "{endpoint} redirected to {location}"
            );
        }
    }

    #[tokio::test]
    async fn public_pages_render_without_session() {
        let (server, _) = get_test_server();

        for endpoint in [endpoints::ROOT, endpoints::LOG_IN_VIEW, endpoints::REGISTER] {
            server.get(endpoint).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn unknown_route_renders_not_found() {
        let (server, _) = get_test_server();

        server
            .get("/does/not/exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn registering_logs_user_in() {
        let (server, state) = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&[
                ("first_name", "Alice"),
                ("last_name", "Smith"),
                ("email", "alice@example.com"),
                ("password", TEST_PASSWORD),
                ("confirm_password", TEST_PASSWORD),
            ])
            .await;

        response.assert_status_see_other();
        let cookie = response.cookie(SESSION_COOKIE);
        server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(cookie)
            .await
            .assert_status_ok();

        let connection = state.db_connection.lock().unwrap();
        let user_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(user_count, 1);
    }

    #[tokio::test]
    async fn budget_flow_updates_balance_and_report() {
        let (server, state) = get_test_server();
        let user = add_user(&state, "test@example.com");
        let cookie = log_in(&server, "test@example.com").await;

        server
            .post(endpoints::CREATE_CATEGORY)
            .add_cookie(cookie.clone())
            .form(&[("category", "Salary"), ("budget", "1000"), ("type", "Income")])
            .await
            .assert_status_see_other();

        let category_id = {
            let connection = state.db_connection.lock().unwrap();
            get_categories(user.id, &connection).unwrap()[0].id
        };

        server
            .post(endpoints::ADD_TRANSACTION)
            .add_cookie(cookie.clone())
            .form(&[
                ("amount", "100"),
                ("category", category_id.to_string().as_str()),
                ("description", "First pay"),
                ("date", "2025-02-01"),
            ])
            .await
            .assert_status_see_other();

        let dashboard = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(cookie.clone())
            .await;
        dashboard.assert_status_ok();
        assert!(dashboard.text().contains("$100.00"));

        let master_table = server
            .get(endpoints::MASTER_TABLE_VIEW)
            .add_cookie(cookie.clone())
            .await;
        master_table.assert_status_ok();
        assert!(master_table.text().contains("Salary"));

        let transaction_id = {
            let connection = state.db_connection.lock().unwrap();
            assert_eq!(get_user_by_id(user.id, &connection).unwrap().balance, 100.0);
            get_transactions(user.id, &connection).unwrap()[0].id
        };

        server
            .get(&format_endpoint(endpoints::DELETE_TRANSACTION, transaction_id))
            .add_cookie(cookie)
            .await
            .assert_status_see_other();

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_user_by_id(user.id, &connection).unwrap().balance, 0.0);
    }

    #[tokio::test]
    async fn users_cannot_touch_each_others_categories() {
        let (server, state) = get_test_server();
        let owner = add_user(&state, "owner@example.com");
        add_user(&state, "other@example.com");

        let owner_cookie = log_in(&server, "owner@example.com").await;
        server
            .post(endpoints::CREATE_CATEGORY)
            .add_cookie(owner_cookie)
            .form(&[("category", "Rent"), ("budget", "500"), ("type", "Expense")])
            .await
            .assert_status_see_other();
        let category_id = {
            let connection = state.db_connection.lock().unwrap();
            get_categories(owner.id, &connection).unwrap()[0].id
        };

        let other_cookie = log_in(&server, "other@example.com").await;

        server
            .get(&format_endpoint(endpoints::EDIT_CATEGORY, category_id))
            .add_cookie(other_cookie.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post(&format_endpoint(endpoints::EDIT_CATEGORY, category_id))
            .add_cookie(other_cookie.clone())
            .form(&[("category", "Stolen"), ("budget", "1"), ("type", "Expense")])
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&format_endpoint(endpoints::DELETE_CATEGORY, category_id))
            .add_cookie(other_cookie)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        let categories = get_categories(owner.id, &connection).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Rent");
    }
}

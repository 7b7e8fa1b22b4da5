//! Middleware that admits requests with a live session and keeps that session alive.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{
        cookie::{get_session, renew_session},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
};

/// Only let through requests that carry a live session.
///
/// The session's user ID is added to the request extensions, so handlers can
/// take `Extension(user_id): Extension<UserID>`. Each admitted request pushes
/// the session expiry back (see [renew_session]). Anything else is redirected
/// to the log-in page, which returns the user to the requested page afterwards.
pub async fn auth_guard(jar: PrivateCookieJar, mut request: Request, next: Next) -> Response {
    let session = match get_session(&jar) {
        Ok(session) => session,
        Err(error) => {
            tracing::warn!("Rejected session for {}: {error}", request.uri().path());
            return Redirect::to(&log_in_redirect(&request)).into_response();
        }
    };

    request.extensions_mut().insert(session.user_id);
    let response = next.run(request).await;

    match renew_session(jar, session) {
        Ok(jar) => (jar, response).into_response(),
        Err(error) => {
            tracing::error!("Could not renew session for user {}: {error}", session.user_id);
            response
        }
    }
}

fn log_in_redirect(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        tracing::warn!("Invalid redirect URL from request URI. Falling back to dashboard.");

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router, middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error, UserID,
        auth::{SESSION_COOKIE, start_session},
        endpoints,
    };

    use super::auth_guard;

    async fn test_handler(Extension(user_id): Extension<UserID>) -> String {
        format!("Hello, user {user_id}!")
    }

    async fn stub_log_in_route(jar: PrivateCookieJar) -> Result<PrivateCookieJar, Error> {
        start_session(jar, UserID::new(1), Duration::seconds(5))
    }

    async fn stub_long_log_in_route(jar: PrivateCookieJar) -> Result<PrivateCookieJar, Error> {
        start_session(jar, UserID::new(1), Duration::hours(1))
    }

    const TEST_LOG_IN_ROUTE_PATH: &str = "/log_in";
    const TEST_LONG_LOG_IN_ROUTE_PATH: &str = "/log_in_long";
    const TEST_PROTECTED_ROUTE: &str = "/protected";

    fn get_test_server() -> TestServer {
        let hash = sha2::Sha512::digest("nafstenoas");
        let key = Key::from(&hash);

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(key.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE_PATH, post(stub_log_in_route))
            .route(TEST_LONG_LOG_IN_ROUTE_PATH, post(stub_long_log_in_route))
            .with_state(key);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(2),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[track_caller]
    fn assert_redirects_to_log_in(response: &axum_test::TestResponse) {
        response.assert_status_see_other();
        let expected_query =
            serde_urlencoded::to_string([("redirect_url", TEST_PROTECTED_ROUTE)]).unwrap();
        let expected_location = format!("{}?{}", endpoints::LOG_IN_VIEW, expected_query);
        assert_eq!(response.header("location"), expected_location);
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let server = get_test_server();
        let response = server.post(TEST_LOG_IN_ROUTE_PATH).await;

        response.assert_status_ok();
        let token_cookie = response.cookie(SESSION_COOKIE);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
        response.assert_text("Hello, user 1!");
    }

    #[tokio::test]
    async fn auth_guard_extends_valid_cookie_duration() {
        let server = get_test_server();
        let response = server.post(TEST_LOG_IN_ROUTE_PATH).await;

        response.assert_status_ok();
        let response_time = OffsetDateTime::now_utc();
        let jar = response.cookies();
        assert_date_time_close(
            jar.get(SESSION_COOKIE).unwrap().expires_datetime().unwrap(),
            response_time + Duration::seconds(5),
        );

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        let auth_cookie = response.cookie(SESSION_COOKIE);
        assert_date_time_close(
            auth_cookie.expires_datetime().unwrap(),
            response_time + Duration::minutes(5),
        );
        assert_eq!(auth_cookie.secure(), Some(true));
        assert_eq!(auth_cookie.http_only(), Some(true));
        assert_eq!(auth_cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn get_protected_route_with_no_auth_cookie_redirects_to_log_in() {
        let server = get_test_server();

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        assert_redirects_to_log_in(&response);
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_auth_cookie_redirects_to_log_in() {
        let server = get_test_server();

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((SESSION_COOKIE, "FOOBAR")).build())
            .await;

        assert_redirects_to_log_in(&response);
    }

    #[tokio::test]
    async fn long_session_is_not_reissued() {
        let server = get_test_server();
        let response = server.post(TEST_LONG_LOG_IN_ROUTE_PATH).await;
        let token_cookie = response.cookie(SESSION_COOKIE);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
        assert!(response.cookies().get(SESSION_COOKIE).is_none());
    }
}

//! The public landing page.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    auth::get_session,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, base},
};

/// Display the landing page.
///
/// Visitors with a valid session are pointed to their dashboard, everyone
/// else to the log-in and registration pages.
pub async fn get_landing_page(jar: PrivateCookieJar) -> Response {
    let is_logged_in = get_session(&jar).is_ok();

    landing_view(is_logged_in).into_response()
}

fn landing_view(is_logged_in: bool) -> Markup {
    let content = html! {
        section class="flex flex-col items-center justify-center min-h-screen px-6 py-8 text-gray-900 dark:text-white"
        {
            div class="max-w-md w-full space-y-6 text-center"
            {
                h1 class="text-4xl font-extrabold tracking-tight" { "Budget Tracker" }

                p class="text-lg text-gray-600 dark:text-gray-400"
                {
                    "Record your income and expenses, plan a budget for each category and see how you are tracking."
                }

                nav id="landing-links" class="flex flex-col gap-4 items-center"
                {
                    @if is_logged_in {
                        a href=(endpoints::DASHBOARD_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Go to Dashboard" }
                        a href=(endpoints::LOG_OUT) class=(LINK_STYLE) { "Log out" }
                    } @else {
                        a href=(endpoints::LOG_IN_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Log in" }
                        a href=(endpoints::REGISTER) class=(LINK_STYLE) { "Create an account" }
                    }
                }
            }
        }
    };

    base("Welcome", &[], &content)
}

//! User authentication with a private session cookie, plus the account pages.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, end_session, get_session, start_session};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, register_user};

#[cfg(test)]
pub(crate) use cookie::SESSION_COOKIE;

//! Login sessions and the private cookie that carries them.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use cookie::CookieBuilder;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID};

/// The name of the cookie holding the serialized [Session].
pub(crate) const SESSION_COOKIE: &str = "auth_token";
/// How long a new session lasts by default.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::hours(1);
/// Each authenticated request keeps the session alive for at least this long.
pub(crate) const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// Who is logged in and until when.
///
/// Serialized to JSON with the expiry as a Unix timestamp, e.g.
/// `{"user_id":1,"expires_at":1766289240}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Session {
    pub user_id: UserID,
    /// The session is invalid at and after this time.
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Start a session for `user_id` that lasts `duration` from `now`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::CookieError] if the expiry overflows.
    pub fn new(user_id: UserID, duration: Duration, now: OffsetDateTime) -> Result<Self, Error> {
        Ok(Self {
            user_id,
            expires_at: expiry_after(now, duration)?,
        })
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// The session kept alive until at least `extension` after `now`.
    ///
    /// A session that already outlasts that point is returned unchanged.
    pub fn renewed(self, extension: Duration, now: OffsetDateTime) -> Result<Self, Error> {
        Ok(Self {
            expires_at: self.expires_at.max(expiry_after(now, extension)?),
            ..self
        })
    }
}

fn expiry_after(now: OffsetDateTime, duration: Duration) -> Result<OffsetDateTime, Error> {
    now.checked_add(duration)
        // The cookie stores whole seconds.
        .and_then(|expiry| expiry.replace_nanosecond(0).ok())
        .ok_or_else(|| Error::CookieError("session expiry overflowed".to_owned()))
}

/// Log `user_id` in for `duration` by adding a session cookie to `jar`.
///
/// # Errors
///
/// Returns an [Error::CookieError] if the session cannot be created or serialized.
pub(crate) fn start_session(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let session = Session::new(user_id, duration, OffsetDateTime::now_utc())?;

    store_session(jar, session)
}

/// Push back the expiry of `session` per [Session::renewed] and store it in `jar`.
///
/// The jar is left alone when the session already outlasts the extension.
pub(crate) fn renew_session(
    jar: PrivateCookieJar,
    session: Session,
) -> Result<PrivateCookieJar, Error> {
    let renewed = session.renewed(SESSION_EXTENSION, OffsetDateTime::now_utc())?;

    if renewed == session {
        return Ok(jar);
    }

    store_session(jar, renewed)
}

fn store_session(jar: PrivateCookieJar, session: Session) -> Result<PrivateCookieJar, Error> {
    let value =
        serde_json::to_string(&session).map_err(|error| Error::CookieError(error.to_string()))?;

    Ok(jar.add(session_cookie(value).expires(session.expires_at)))
}

fn session_cookie(value: String) -> CookieBuilder<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
}

/// Overwrite the session cookie with an expired placeholder so the browser drops it.
pub(crate) fn end_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        session_cookie("deleted".to_owned())
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO),
    )
}

/// Read the current session from `jar`.
///
/// # Errors
///
/// Returns an [Error::CookieError] if the cookie is missing, cannot be
/// deserialized or the session has expired.
pub(crate) fn get_session(jar: &PrivateCookieJar) -> Result<Session, Error> {
    let cookie = jar
        .get(SESSION_COOKIE)
        .ok_or_else(|| Error::CookieError("session cookie missing".to_owned()))?;

    let session: Session = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::CookieError(error.to_string()))?;

    if session.is_expired(OffsetDateTime::now_utc()) {
        return Err(Error::CookieError("session expired".to_owned()));
    }

    Ok(session)
}

//! The registration page for creating a new user account.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{get_session, password::MIN_PASSWORD_LENGTH, start_session},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, form_error, labelled_input, log_in_register, password_input,
    },
    user::{NewUser, create_user},
};

/// The error messages to show next to the registration form fields.
#[derive(Debug, Default)]
struct RegistrationErrors<'a> {
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
    form: Option<&'a str>,
}

fn registration_form(user_data: &RegisterForm, errors: RegistrationErrors) -> Markup {
    // The HTML attribute takes a u8, the password policy is defined as a usize.
    let min_length = MIN_PASSWORD_LENGTH as u8;

    html! {
        form
            method="post"
            action=(endpoints::REGISTER)
            class="space-y-4 md:space-y-6"
        {
            (labelled_input("First Name", "first_name", "text", &user_data.first_name, None))
            (labelled_input("Last Name", "last_name", "text", &user_data.last_name, None))
            (labelled_input("Email", "email", "email", &user_data.email, None))
            (password_input("Password", "password", min_length, errors.password))
            (password_input("Confirm Password", "confirm_password", min_length, errors.confirm_password))

            (form_error(errors.form))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

fn registration_page(user_data: &RegisterForm, errors: RegistrationErrors) -> Markup {
    let registration_form = registration_form(user_data, errors);
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content)
}

/// Display the registration page.
///
/// Visitors who are already logged in are sent to their dashboard instead.
pub async fn get_register_page(jar: PrivateCookieJar) -> Response {
    if get_session(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    registration_page(&RegisterForm::default(), RegistrationErrors::default()).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Check the registration form and return the details for the new user
/// along with the validated password.
fn validate_registration(
    user_data: &RegisterForm,
) -> Result<(String, String, EmailAddress, ValidatedPassword), Error> {
    let first_name = user_data.first_name.trim();
    let last_name = user_data.last_name.trim();
    let email = user_data.email.trim();

    for (value, field_name) in [
        (first_name, "First name"),
        (last_name, "Last name"),
        (email, "Email"),
        (user_data.password.as_str(), "Password"),
        (user_data.confirm_password.as_str(), "Confirm password"),
    ] {
        if value.is_empty() {
            return Err(Error::MissingField(field_name));
        }
    }

    let email: EmailAddress = email
        .parse()
        .map_err(|_| Error::InvalidEmail(email.to_owned()))?;

    let validated_password = ValidatedPassword::new(&user_data.password)?;

    if user_data.password != user_data.confirm_password {
        return Err(Error::PasswordMismatch);
    }

    Ok((
        first_name.to_owned(),
        last_name.to_owned(),
        email,
        validated_password,
    ))
}

/// Create a new user, log them in and redirect them to the dashboard.
///
/// Invalid input and an already registered email re-render the form with an
/// error message and the values the user entered (apart from the passwords).
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let render_error = |status_code: StatusCode, error: &Error| {
        let message = error.to_string();
        let errors = match error {
            Error::InvalidPassword(_) => RegistrationErrors {
                password: Some(&message),
                ..Default::default()
            },
            Error::PasswordMismatch => RegistrationErrors {
                confirm_password: Some(&message),
                ..Default::default()
            },
            _ => RegistrationErrors {
                form: Some(&message),
                ..Default::default()
            },
        };
        let user_data = RegisterForm {
            password: String::new(),
            confirm_password: String::new(),
            first_name: user_data.first_name.clone(),
            last_name: user_data.last_name.clone(),
            email: user_data.email.clone(),
        };

        (status_code, registration_page(&user_data, errors)).into_response()
    };

    let (first_name, last_name, email, validated_password) =
        match validate_registration(&user_data) {
            Ok(validated) => validated,
            Err(error) => return render_error(StatusCode::UNPROCESSABLE_ENTITY, &error),
        };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return error.into_response();
        }
    };

    let new_user = NewUser {
        first_name,
        last_name,
        email,
        password_hash,
    };

    let user = match state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| create_user(new_user, &connection))
    {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return render_error(StatusCode::CONFLICT, &Error::DuplicateEmail);
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return error.into_response();
        }
    };

    tracing::info!("Registered user {}", user.id);

    match start_session(jar, user.id, state.cookie_duration) {
        Ok(jar) => (jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response(),
        Err(error) => {
            tracing::error!("An error occurred while starting the session: {error}");
            Redirect::to(endpoints::LOG_IN_VIEW).into_response()
        }
    }
}

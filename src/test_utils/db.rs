use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    PasswordHash, User,
    db::initialize,
    user::{NewUser, create_user},
};

/// A password that satisfies the password policy.
pub(crate) const TEST_PASSWORD: &str = "Passw0rd";

/// An in-memory database with all tables created.
pub(crate) fn test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user with the password [TEST_PASSWORD].
///
/// The password is hashed with the lowest bcrypt cost to keep tests fast.
pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> User {
    create_user(
        NewUser {
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: EmailAddress::new_unchecked(email),
            password_hash: PasswordHash::from_raw_password(TEST_PASSWORD, 4)
                .expect("Could not hash password"),
        },
        connection,
    )
    .expect("Could not create test user")
}

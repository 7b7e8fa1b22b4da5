//! This file defines types that handle password validation and hashing.
//! `ValidatedPassword` wraps a string and ensures it meets the password policy.
//! `PasswordHash` converts a `ValidatedPassword` into a salted and hashed password.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The minimum number of characters in a password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A password that has been validated, but not yet hashed.
///
/// This struct can be used to construct a [PasswordHash].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create and validate a new password from a string.
    ///
    /// A valid password has at least [MIN_PASSWORD_LENGTH] characters, no
    /// whitespace, and at least one lowercase letter, one uppercase letter
    /// and one digit.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidPassword] if the password
    /// breaks one of the rules. The error message names the first broken rule.
    pub fn new(raw_password_string: &str) -> Result<Self, Error> {
        let rule_error = |message: &str| Err(Error::InvalidPassword(message.to_owned()));

        if raw_password_string.chars().count() < MIN_PASSWORD_LENGTH {
            return rule_error("Password must be at least 8 characters long");
        }

        if raw_password_string.chars().any(char::is_whitespace) {
            return rule_error("Password must not contain spaces");
        }

        if !raw_password_string.chars().any(|c| c.is_ascii_lowercase()) {
            return rule_error("Password must contain at least one lowercase letter");
        }

        if !raw_password_string.chars().any(|c| c.is_ascii_uppercase()) {
            return rule_error("Password must contain at least one uppercase letter");
        }

        if !raw_password_string.chars().any(|c| c.is_ascii_digit()) {
            return rule_error("Password must contain at least one digit");
        }

        Ok(Self(raw_password_string.to_string()))
    }

    /// Create a new `ValidatedPassword` without any validation.
    ///
    /// The caller should ensure that `raw_password_string` is a valid and secure password.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid password is provided it may cause incorrect behaviour but will not affect memory safety.
    pub fn new_unchecked(raw_password_string: &str) -> Self {
        Self(raw_password_string.to_string())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Create a hashed password from a validated password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// A value of at least 12 is recommended. Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid password hash.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid hash is provided it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Try to create a password hash from a raw password string.
    ///
    /// This is a convenience function that removes the need to manually create
    /// the intermediate `ValidatedPassword` type.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let validated_password = ValidatedPassword::new(raw_password)?;
        PasswordHash::new(validated_password, cost)
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod validated_password_tests {
    use crate::{Error, auth::ValidatedPassword};

    #[track_caller]
    fn assert_rejected(password: &str) {
        let result = ValidatedPassword::new(password);

        assert!(
            matches!(result, Err(Error::InvalidPassword(_))),
            "want password {password:?} to be rejected, got {result:?}"
        );
    }

    #[test]
    fn accepts_password_meeting_every_rule() {
        assert!(ValidatedPassword::new("Passw0rd").is_ok());
    }

    #[test]
    fn rejects_empty_password() {
        assert_rejected("");
    }

    #[test]
    fn rejects_short_password() {
        assert_rejected("Pass0rd");
    }

    #[test]
    fn rejects_password_with_whitespace() {
        assert_rejected("Pass w0rd");
        assert_rejected("Passw0rd\t");
    }

    #[test]
    fn rejects_password_without_uppercase() {
        assert_rejected("passw0rd");
    }

    #[test]
    fn rejects_password_without_lowercase() {
        assert_rejected("PASSW0RD");
    }

    #[test]
    fn rejects_password_without_digit() {
        assert_rejected("Password");
    }

    #[test]
    fn error_names_the_broken_rule() {
        let result = ValidatedPassword::new("password1");

        assert_eq!(
            result,
            Err(Error::InvalidPassword(
                "Password must contain at least one uppercase letter".to_owned()
            ))
        );
    }
}

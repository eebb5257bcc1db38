//! Login credential handling.

use zeroize::Zeroizing;

use super::error::DomainError;

/// Validated login credentials.
///
/// The plaintext password lives in a [`Zeroizing`] buffer and is wiped from
/// memory when the credentials are dropped.
#[derive(Debug)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate the submitted fields.
    ///
    /// Validation here is deliberately shallow; anything beyond "both fields
    /// present and plausible" would leak which part was wrong.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, DomainError> {
        let email = email.into();
        let password = Zeroizing::new(password.into());
        if email.trim().is_empty() || !email.contains('@') {
            return Err(DomainError::invalid_request(
                "email and password are required",
            ));
        }
        if password.is_empty() {
            return Err(DomainError::invalid_request(
                "email and password are required",
            ));
        }
        Ok(Self { email, password })
    }

    /// Login email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Plaintext password for verification against the stored hash.
    pub fn password(&self) -> &str {
        &self.password
    }
}

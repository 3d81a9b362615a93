//! Password policy applied before a password is stored.

use thiserror::Error;

pub const MAX_PASSWORD_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Invalid password")]
    Invalid,
}

/// Accepts any non-empty password of at most [`MAX_PASSWORD_CHARS`] characters.
pub fn check_user_password(password: &str) -> Result<(), PasswordPolicyError> {
    if password.is_empty() || password.chars().count() > MAX_PASSWORD_CHARS {
        return Err(PasswordPolicyError::Invalid);
    }
    Ok(())
}

//! Argon2id password hashes in PHC string form.

use super::IdentityDomainError;
use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use std::fmt;

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Argon2id password hash stored as a PHC string (`$argon2id$v=19$...`).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes a plaintext password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::PasswordTooShort`] when the password has
    /// fewer than [`MIN_PASSWORD_LENGTH`] characters and
    /// [`IdentityDomainError::PasswordHashing`] when hashing fails.
    pub fn create(password: &str) -> Result<Self, IdentityDomainError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(IdentityDomainError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| IdentityDomainError::PasswordHashing(err.to_string()))?;
        Ok(Self(phc.to_string()))
    }

    /// Reconstructs a hash loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::MalformedPasswordHash`] when the value
    /// is not a PHC string.
    pub fn from_persisted(value: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let raw = value.into();
        if PhcString::new(&raw).is_err() {
            return Err(IdentityDomainError::MalformedPasswordHash);
        }
        Ok(Self(raw))
    }

    /// Returns `true` when `password` matches this hash.
    ///
    /// The comparison runs in constant time inside `argon2`.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        PhcString::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Returns the stored representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

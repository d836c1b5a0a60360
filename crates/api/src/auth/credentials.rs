//! Password hashing and the login policy.

use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Longer inputs are refused before hashing.
pub const MAX_PASSWORD_CHARS: usize = 128;

/// Consecutive failures that lock an account.
pub const MAX_FAILED_LOGINS: i32 = 5;

/// How long a locked account stays locked.
pub const LOCKOUT_SECS: i64 = 15 * 60;

/// Argon2id PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// `Ok(false)` on mismatch, `Err` when `stored` is not a PHC string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Spend the same work as a real verification when the email is unknown,
/// so response time does not reveal which accounts exist.
pub fn burn_verification(password: &str) {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    if let Some(hash) = DUMMY.get_or_init(|| hash_password("sonora-dummy-password").ok()) {
        let _ = verify_password(password, hash);
    }
}

/// Registration rules: length bounds, and not the account's own email.
pub fn check_new_password(password: &str, email: &str) -> Result<(), String> {
    let chars = password.chars().count();
    if chars < MIN_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters long"
        ));
    }
    if chars > MAX_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at most {MAX_PASSWORD_CHARS} characters long"
        ));
    }
    if password.trim().eq_ignore_ascii_case(email.trim()) {
        return Err("Password must not be the email address".to_string());
    }
    Ok(())
}

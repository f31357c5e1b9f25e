use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;

/// A hash with the same parameters as real ones, checked when the username is unknown.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("placeholder-for-unknown-users").ok());

/// Hashes a plaintext password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(phc)
}

/// Checks a plaintext password against a stored PHC string. A malformed hash never verifies.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is malformed: {e}");
            false
        }
    }
}

/// The hash [`verify_unknown_user`] checks against; `None` only if hashing itself failed.
pub fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH.as_deref()
}

/// Spends the same verification work as [`verify_password`] for a username that does not
/// exist, so signin timing does not reveal which accounts exist. Always false.
pub fn verify_unknown_user(password: &str) -> bool {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(hash, password);
    }
    false
}

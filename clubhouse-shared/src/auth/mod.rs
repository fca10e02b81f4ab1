/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
///
/// Sessions and tokens are not issued yet; `/login` is a placeholder.

pub mod password;

/// Middleware for the API server
///
/// - `security`: hardening response headers

pub mod security;

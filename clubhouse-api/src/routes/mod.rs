/// API route handlers, by resource
///
/// - `health`: liveness and database connectivity
/// - `users`: signup, login placeholder, user maintenance
/// - `organizations`: organization CRUD

pub mod health;
pub mod organizations;
pub mod users;

/// Middleware modules for the API server
///
/// - Security headers on every response
/// - Shared-secret check for the admin endpoints

pub mod admin_key;
pub mod security;

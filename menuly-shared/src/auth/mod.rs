/// Authentication and authorization utilities
///
/// Menuly never verifies passwords or signs tokens itself; the backend owns
/// both. This module covers what remains on our side:
///
/// # Modules
///
/// - [`session`]: Extract session credentials and resolve them to a user
/// - [`authorization`]: Ownership and role checks against profile rows
/// - [`admin_key`]: Shared-secret checks for operational endpoints
/// - [`password`]: Password strength rules and generated passwords
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use menuly_shared::auth::session::{SessionCredentials, SessionResolver};
/// use menuly_shared::baas::MockBaas;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = SessionResolver::new(Arc::new(MockBaas::new()));
/// let credentials = SessionCredentials::from_access_token("token");
///
/// match resolver.resolve(Some(&credentials)).await? {
///     Some(session) => println!("Signed in as {}", session.user_id),
///     None => println!("No session"),
/// }
/// # Ok(())
/// # }
/// ```

pub mod admin_key;
pub mod authorization;
pub mod password;
pub mod session;

/// Authorization helpers
///
/// Every protected handler performs exactly one authorization lookup against
/// a profile row, then decides. There is no policy engine and no caching: the
/// backend row is read, compared with the session, and the result returned.
///
/// # Permission Model
///
/// 1. **Ownership**: staff rows belong to the owner in `owner_id`
/// 2. **Role**: `admin` > `owner` > `staff`, read from the caller's profile
///
/// # Example
///
/// ```no_run
/// use menuly_shared::auth::authorization::require_owned_staff;
/// use menuly_shared::auth::session::Session;
/// use menuly_shared::baas::Baas;
/// use uuid::Uuid;
///
/// # async fn example(baas: &dyn Baas, session: &Session, staff_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let staff = require_owned_staff(baas, session, staff_id).await?;
/// baas.delete_profile(staff.id).await?;
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use super::session::Session;
use crate::baas::{Baas, BaasError};
use crate::models::{Profile, ProfileRole};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller has no profile row
    #[error("No profile for user {0}")]
    ProfileMissing(Uuid),

    /// Caller's role is too low
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: ProfileRole,
        actual: ProfileRole,
    },

    /// Resource missing or owned by someone else
    #[error("Not authorized to access this resource")]
    NotAuthorized,

    /// Lookup failed upstream
    #[error("Backend error: {0}")]
    Backend(#[from] BaasError),
}

/// Checks the session owns a resource
///
/// A resource without an owner is never owned by anyone.
pub fn require_ownership(session: &Session, resource_owner_id: Option<Uuid>) -> Result<(), AuthzError> {
    if resource_owner_id != Some(session.user_id) {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

/// Loads the caller's profile and checks its role
///
/// # Returns
///
/// The caller's profile on success.
///
/// # Errors
///
/// - `ProfileMissing` if the caller has no profile row
/// - `InsufficientRole` if the role is below `required`
pub async fn require_role(
    baas: &dyn Baas,
    session: &Session,
    required: ProfileRole,
) -> Result<Profile, AuthzError> {
    let profile = baas
        .get_profile(session.user_id)
        .await?
        .ok_or(AuthzError::ProfileMissing(session.user_id))?;

    if !profile.role.has_permission(&required) {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: profile.role,
        });
    }

    Ok(profile)
}

/// Loads a staff row and checks it belongs to the caller
///
/// Missing rows, non-staff rows and rows owned by someone else all yield
/// `NotAuthorized`, so callers cannot probe for other owners' staff.
pub async fn require_owned_staff(
    baas: &dyn Baas,
    session: &Session,
    staff_id: Uuid,
) -> Result<Profile, AuthzError> {
    let staff = baas
        .get_profile(staff_id)
        .await?
        .ok_or(AuthzError::NotAuthorized)?;

    if !staff.is_staff() {
        return Err(AuthzError::NotAuthorized);
    }
    require_ownership(session, staff.owner_id)?;

    Ok(staff)
}

/// In-memory backend for testing and demos
///
/// `MockBaas` behaves like a tiny Supabase project:
/// - Access tokens registered with [`MockBaas::with_session`] resolve to users,
///   anything else is rejected with 401
/// - Profiles and QR codes live in memory
/// - `create_user` also inserts the profile row, the way the project's
///   `on_auth_user_created` trigger does
///
/// Every call is recorded so tests can assert which backend operations a
/// handler performed (or did not perform).
///
/// # Example
///
/// ```
/// use menuly_shared::baas::{Baas, BaasCall, MockBaas};
/// use uuid::Uuid;
///
/// # async fn example() {
/// let user_id = Uuid::new_v4();
/// let baas = MockBaas::new().with_session("token-1", MockBaas::auth_user(user_id, "owner@example.com"));
///
/// let user = baas.get_user("token-1").await.unwrap();
/// assert_eq!(user.id, user_id);
/// assert_eq!(baas.calls().await, vec![BaasCall::GetUser]);
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Baas, BaasError, BaasResult, ClientContext};
use crate::models::{AuthUser, NewAuthUser, Profile, ProfileRole, QrCode};

/// A recorded backend operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaasCall {
    Health,
    GetUser,
    GetProfile(Uuid),
    ListStaff(Uuid),
    DeleteProfile(Uuid),
    CreateUser(String),
    ListUsers { page: u32, per_page: u32 },
    ListQrCodes(Uuid),
}

impl BaasCall {
    /// True for operations that change backend state
    pub fn is_write(&self) -> bool {
        matches!(self, BaasCall::DeleteProfile(_) | BaasCall::CreateUser(_))
    }
}

/// Failure injected into every call after the call is recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Backend answers with this status and message
    Api { status: u16, message: String },

    /// Backend is unreachable
    Offline,
}

#[derive(Debug, Default)]
struct MockState {
    sessions: HashMap<String, AuthUser>,
    users: Vec<AuthUser>,
    profiles: HashMap<Uuid, Profile>,
    qr_codes: Vec<QrCode>,
    calls: Vec<BaasCall>,
    failure: Option<MockFailure>,
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MockBaas {
    state: Mutex<MockState>,
}

impl MockBaas {
    /// Creates an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a minimal auth user
    pub fn auth_user(id: Uuid, email: &str) -> AuthUser {
        AuthUser {
            id,
            email: Some(email.to_string()),
            role: Some("authenticated".to_string()),
            user_metadata: serde_json::json!({}),
            created_at: Some(Utc::now()),
            last_sign_in_at: None,
            email_confirmed_at: Some(Utc::now()),
        }
    }

    /// Builds a profile row
    pub fn profile(id: Uuid, role: ProfileRole, owner_id: Option<Uuid>) -> Profile {
        Profile {
            id,
            email: Some(format!("{}@example.com", id.simple())),
            full_name: None,
            role,
            owner_id,
            restaurant_id: None,
            created_at: Utc::now(),
        }
    }

    /// Registers an access token that resolves to `user`
    pub fn with_session(mut self, token: &str, user: AuthUser) -> Self {
        let state = self.state.get_mut();
        state.users.push(user.clone());
        state.sessions.insert(token.to_string(), user);
        self
    }

    /// Adds a profile row
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.state.get_mut().profiles.insert(profile.id, profile);
        self
    }

    /// Adds a QR code row
    pub fn with_qr_code(mut self, code: QrCode) -> Self {
        self.state.get_mut().qr_codes.push(code);
        self
    }

    /// Makes every subsequent call fail
    pub async fn set_failure(&self, failure: Option<MockFailure>) {
        self.state.lock().await.failure = failure;
    }

    /// All calls recorded so far, in order
    pub async fn calls(&self) -> Vec<BaasCall> {
        self.state.lock().await.calls.clone()
    }

    /// Recorded calls that change backend state
    pub async fn write_calls(&self) -> Vec<BaasCall> {
        self.calls().await.into_iter().filter(BaasCall::is_write).collect()
    }

    /// Current profile row, bypassing call recording
    pub async fn stored_profile(&self, id: Uuid) -> Option<Profile> {
        self.state.lock().await.profiles.get(&id).cloned()
    }

    /// Adds a QR code row to a shared backend, bypassing call recording
    pub async fn insert_qr_code(&self, code: QrCode) {
        self.state.lock().await.qr_codes.push(code);
    }

    /// Records `call` and applies the injected failure, if any
    async fn enter(&self, call: BaasCall) -> BaasResult<tokio::sync::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock().await;
        state.calls.push(call);

        match state.failure.clone() {
            None => Ok(state),
            Some(MockFailure::Api { status, message }) => Err(BaasError::Api { status, message }),
            Some(MockFailure::Offline) => {
                Err(BaasError::Transport("connection refused".to_string()))
            }
        }
    }
}

#[async_trait]
impl Baas for MockBaas {
    fn context(&self) -> ClientContext {
        ClientContext::Server
    }

    async fn health(&self) -> BaasResult<()> {
        self.enter(BaasCall::Health).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> BaasResult<AuthUser> {
        let state = self.enter(BaasCall::GetUser).await?;
        state
            .sessions
            .get(access_token)
            .cloned()
            .ok_or_else(|| BaasError::Api {
                status: 401,
                message: "invalid JWT: unable to parse or verify signature".to_string(),
            })
    }

    async fn get_profile(&self, id: Uuid) -> BaasResult<Option<Profile>> {
        let state = self.enter(BaasCall::GetProfile(id)).await?;
        Ok(state.profiles.get(&id).cloned())
    }

    async fn list_staff(&self, owner_id: Uuid) -> BaasResult<Vec<Profile>> {
        let state = self.enter(BaasCall::ListStaff(owner_id)).await?;
        let mut staff: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| p.is_staff() && p.is_owned_by(owner_id))
            .cloned()
            .collect();
        staff.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(staff)
    }

    async fn delete_profile(&self, id: Uuid) -> BaasResult<()> {
        let mut state = self.enter(BaasCall::DeleteProfile(id)).await?;
        state.profiles.remove(&id);
        Ok(())
    }

    async fn create_user(&self, user: NewAuthUser) -> BaasResult<AuthUser> {
        let mut state = self.enter(BaasCall::CreateUser(user.email.clone())).await?;

        if state.users.iter().any(|u| u.email.as_deref() == Some(user.email.as_str())) {
            return Err(BaasError::Api {
                status: 422,
                message: "A user with this email address has already been registered".to_string(),
            });
        }

        let created = AuthUser {
            user_metadata: user.user_metadata.clone(),
            ..Self::auth_user(Uuid::new_v4(), &user.email)
        };
        state.users.push(created.clone());

        // Profile trigger
        let metadata = &user.user_metadata;
        let profile = Profile {
            id: created.id,
            email: Some(user.email.clone()),
            full_name: metadata
                .get("full_name")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            role: created.app_role().unwrap_or(ProfileRole::Owner),
            owner_id: metadata
                .get("owner_id")
                .and_then(|v| v.as_str())
                .and_then(|s| Uuid::parse_str(s).ok()),
            restaurant_id: None,
            created_at: Utc::now(),
        };
        state.profiles.insert(profile.id, profile);

        Ok(created)
    }

    async fn list_users(&self, page: u32, per_page: u32) -> BaasResult<Vec<AuthUser>> {
        let state = self.enter(BaasCall::ListUsers { page, per_page }).await?;
        let skip = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        Ok(state
            .users
            .iter()
            .skip(skip)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn list_qr_codes(&self, owner_id: Uuid) -> BaasResult<Vec<QrCode>> {
        let state = self.enter(BaasCall::ListQrCodes(owner_id)).await?;
        let mut codes: Vec<QrCode> = state
            .qr_codes
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let baas = MockBaas::new();
        let err = baas.get_user("nope").await.unwrap_err();
        assert!(err.is_auth_rejection());
    }

    #[tokio::test]
    async fn test_create_user_runs_profile_trigger() {
        let owner = Uuid::new_v4();
        let baas = MockBaas::new();

        let user = baas
            .create_user(NewAuthUser::new("w@example.com", "Secret123!", "Wes", ProfileRole::Staff, Some(owner)))
            .await
            .unwrap();

        let profile = baas.stored_profile(user.id).await.unwrap();
        assert_eq!(profile.role, ProfileRole::Staff);
        assert!(profile.is_owned_by(owner));
        assert_eq!(profile.full_name.as_deref(), Some("Wes"));

        let staff = baas.list_staff(owner).await.unwrap();
        assert_eq!(staff.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let baas = MockBaas::new().with_session("t", MockBaas::auth_user(Uuid::new_v4(), "dup@example.com"));

        let err = baas
            .create_user(NewAuthUser::new("dup@example.com", "Secret123!", "Dup", ProfileRole::Owner, None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
    }

    #[tokio::test]
    async fn test_failure_injection_still_records_call() {
        let baas = MockBaas::new();
        baas.set_failure(Some(MockFailure::Offline)).await;

        let err = baas.health().await.unwrap_err();
        assert!(matches!(err, BaasError::Transport(_)));
        assert_eq!(baas.calls().await, vec![BaasCall::Health]);
    }

    #[tokio::test]
    async fn test_list_users_pagination() {
        let mut baas = MockBaas::new();
        for i in 0..5 {
            baas = baas.with_session(&format!("t{}", i), MockBaas::auth_user(Uuid::new_v4(), &format!("u{}@example.com", i)));
        }

        assert_eq!(baas.list_users(1, 2).await.unwrap().len(), 2);
        assert_eq!(baas.list_users(3, 2).await.unwrap().len(), 1);
        assert!(baas.list_users(4, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_qr_codes_filters_by_owner() {
        let owner = Uuid::new_v4();
        let code = |owner_id| QrCode {
            id: Uuid::new_v4(),
            menu_id: Uuid::new_v4(),
            owner_id,
            name: None,
            design: Default::default(),
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let baas = MockBaas::new()
            .with_qr_code(code(owner))
            .with_qr_code(code(Uuid::new_v4()));
        baas.insert_qr_code(code(owner)).await;

        assert_eq!(baas.list_qr_codes(owner).await.unwrap().len(), 2);
        assert_eq!(baas.calls().await, vec![BaasCall::ListQrCodes(owner)]);
    }

    #[tokio::test]
    async fn test_write_calls_filter() {
        let id = Uuid::new_v4();
        let baas = MockBaas::new().with_profile(MockBaas::profile(id, ProfileRole::Staff, None));

        baas.get_profile(id).await.unwrap();
        baas.delete_profile(id).await.unwrap();

        assert_eq!(baas.write_calls().await, vec![BaasCall::DeleteProfile(id)]);
        assert!(baas.stored_profile(id).await.is_none());
    }
}

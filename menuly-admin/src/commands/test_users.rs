/// `create-test-users`: demo accounts
///
/// Creates one owner and two staff members reporting to them, each with a
/// generated password, and prints the credentials.

use menuly_shared::auth::password::generate_password;
use menuly_shared::baas::Baas;
use menuly_shared::models::{NewAuthUser, ProfileRole};
use uuid::Uuid;

use super::create_user::GENERATED_PASSWORD_LENGTH;

/// Default email domain for demo accounts
pub const DEFAULT_DOMAIN: &str = "menuly.test";

/// A created demo account
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: ProfileRole,
}

/// Creates the demo owner, then the staff
///
/// Stops at the first failure; accounts created before it remain.
pub async fn run(baas: &dyn Baas, domain: &str) -> anyhow::Result<Vec<Credential>> {
    let owner = create(baas, &format!("test-owner@{}", domain), "Test Owner", ProfileRole::Owner, None).await?;

    let mut credentials = vec![owner];
    for n in 1..=2 {
        let owner_id = credentials[0].id;
        let staff = create(
            baas,
            &format!("test-staff-{}@{}", n, domain),
            &format!("Test Staff {}", n),
            ProfileRole::Staff,
            Some(owner_id),
        )
        .await?;
        credentials.push(staff);
    }

    Ok(credentials)
}

async fn create(
    baas: &dyn Baas,
    email: &str,
    full_name: &str,
    role: ProfileRole,
    owner_id: Option<Uuid>,
) -> anyhow::Result<Credential> {
    let password = generate_password(GENERATED_PASSWORD_LENGTH);
    let user = baas
        .create_user(NewAuthUser::new(email, password.clone(), full_name, role, owner_id))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", email, e))?;

    tracing::info!(user_id = %user.id, email, role = role.as_str(), "Test user created");

    Ok(Credential {
        id: user.id,
        email: email.to_string(),
        password,
        role,
    })
}

/// Credentials table for the terminal
pub fn format_credentials(credentials: &[Credential]) -> String {
    let width = credentials.iter().map(|c| c.email.len()).max().unwrap_or(0);

    credentials
        .iter()
        .map(|c| format!("{:<6} {:<width$}  {}", c.role.as_str(), c.email, c.password, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

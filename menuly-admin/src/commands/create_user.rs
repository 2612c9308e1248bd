/// `create-user`: interactive user creation
///
/// Prompts for email, full name, role (and owner for staff) and password.
/// A blank password is replaced by a generated one, which is printed once.

use menuly_shared::auth::password::{generate_password, validate_password_strength};
use menuly_shared::baas::Baas;
use menuly_shared::models::{AuthUser, NewAuthUser, ProfileRole};
use std::io::{BufRead, Write};
use uuid::Uuid;

use super::Prompt;

/// Length of generated passwords
pub const GENERATED_PASSWORD_LENGTH: usize = 16;

/// Answers collected from the operator
#[derive(Debug, Clone, PartialEq)]
pub struct UserRequest {
    pub email: String,
    pub full_name: String,
    pub role: ProfileRole,
    pub owner_id: Option<Uuid>,
    pub password: String,
    pub generated_password: bool,
}

/// Collects a [`UserRequest`] from the terminal
pub fn ask_user<R: BufRead, W: Write>(prompt: &mut Prompt<R, W>) -> anyhow::Result<UserRequest> {
    let email = loop {
        let email = prompt.ask_required("Email")?;
        if email.contains('@') && !email.starts_with('@') && !email.ends_with('@') {
            break email;
        }
        prompt.say("That does not look like an email address")?;
    };

    let full_name = prompt.ask_required("Full name")?;

    let role = loop {
        let answer = prompt.ask("Role (owner, staff, admin)", Some(ProfileRole::Owner.as_str()))?;
        match ProfileRole::parse(&answer) {
            Some(role) => break role,
            None => prompt.say(format!("Unknown role: {}", answer))?,
        }
    };

    let owner_id = if role == ProfileRole::Staff {
        loop {
            let answer = prompt.ask_required("Owner id")?;
            match Uuid::parse_str(&answer) {
                Ok(id) => break Some(id),
                Err(_) => prompt.say("Owner id must be a UUID")?,
            }
        }
    } else {
        None
    };

    let (password, generated_password) = loop {
        let answer = prompt.ask("Password (blank to generate)", None)?;
        if answer.is_empty() {
            break (generate_password(GENERATED_PASSWORD_LENGTH), true);
        }
        match validate_password_strength(&answer) {
            Ok(()) => break (answer, false),
            Err(reason) => prompt.say(reason)?,
        }
    };

    Ok(UserRequest {
        email,
        full_name,
        role,
        owner_id,
        password,
        generated_password,
    })
}

/// Creates the user and prints its credentials
pub async fn run<R: BufRead, W: Write>(
    baas: &dyn Baas,
    prompt: &mut Prompt<R, W>,
) -> anyhow::Result<AuthUser> {
    let request = ask_user(prompt)?;

    let user = baas
        .create_user(NewAuthUser::new(
            request.email.clone(),
            request.password.clone(),
            request.full_name.clone(),
            request.role,
            request.owner_id,
        ))
        .await?;

    tracing::info!(user_id = %user.id, role = request.role.as_str(), "User created");

    prompt.say(format!("Created {} ({})", request.email, request.role.as_str()))?;
    prompt.say(format!("  id:       {}", user.id))?;
    if request.generated_password {
        prompt.say(format!("  password: {}", request.password))?;
    }

    Ok(user)
}

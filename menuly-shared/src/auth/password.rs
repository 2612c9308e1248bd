/// Password rules
///
/// Hashing and verification happen in the backend's auth service. What
/// stays here is the strength policy for passwords we choose ourselves
/// (admin CLI prompts, seeded test users) and a generator for the cases
/// where the operator leaves the password blank.
///
/// # Example
///
/// ```
/// use menuly_shared::auth::password::{generate_password, validate_password_strength};
///
/// let password = generate_password(16);
/// assert_eq!(password.len(), 16);
/// assert!(validate_password_strength(&password).is_ok());
///
/// assert!(validate_password_strength("short").is_err());
/// ```

use rand::seq::SliceRandom;
use rand::Rng;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SPECIAL: &[u8] = b"!@#$%^&*-_=+";

/// Checks the password policy
///
/// Requirements:
/// - At least 8 characters long
/// - Contains at least one uppercase letter
/// - Contains at least one lowercase letter
/// - Contains at least one digit
/// - Contains at least one special character
///
/// # Errors
///
/// Returns the first unmet requirement as a message.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_numeric()) {
        return Err("Password must contain at least one digit".to_string());
    }

    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

/// Generates a password that satisfies [`validate_password_strength`]
///
/// `length` is raised to the minimum if smaller. Ambiguous glyphs
/// (`0`, `O`, `1`, `l`, `I`) are left out so printed credentials can be
/// retyped.
pub fn generate_password(length: usize) -> String {
    let length = length.max(MIN_PASSWORD_LENGTH);
    let mut rng = rand::thread_rng();

    let classes = [UPPER, LOWER, DIGITS, SPECIAL];
    let all: Vec<u8> = classes.concat();

    // One from each class, the rest from the union
    let mut chars: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    chars.extend((chars.len()..length).map(|_| all[rng.gen_range(0..all.len())]));
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

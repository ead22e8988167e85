use crypto_core::{hash_password, verify_password};
use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::models::UserRecord;
use crate::state::AppState;
use crate::validators::{validate_user_input, UserInput};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPayload {
    pub token: String,
    pub user_id: String,
}

/// Register a new user
///
/// Fails with `InvalidInput` (every violated field), or `Conflict` when the
/// email is already registered.
pub async fn create_user(state: &AppState, input: NewUser) -> Result<UserRecord> {
    let NewUser {
        email,
        password,
        name,
    } = input;
    let credentials = UserInput { email, password };
    validate_user_input(&credentials)?;

    if state.users.find_by_email(&credentials.email).await?.is_some() {
        return Err(ApiError::Conflict("User exists already!".to_string()));
    }

    let password_hash = hash_password(&credentials.password)?;
    let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    // A concurrent registration may slip past the lookup above; the store's
    // unique email index turns that into `Conflict` as well.
    let user = state
        .users
        .insert(UserRecord::new(credentials.email, name, password_hash))
        .await?;

    info!(user_id = %user.id, "User created");
    Ok(user)
}

/// Hash checked on the unknown-email path so it costs the same Argon2 work as
/// a wrong password
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("dummy-password-for-unknown-users").ok());

/// Exchange email and password for a signed token
///
/// Unknown email and wrong password fail identically, in outcome and in work.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<AuthPayload> {
    let Some(user) = state.users.find_by_email(email).await? else {
        if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
            let _ = verify_password(password, hash);
        }
        warn!("Login failed: unknown email");
        return Err(invalid_credentials());
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login failed: password mismatch");
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(&user.id, &user.email)?;
    info!(user_id = %user.id, "User logged in");

    Ok(AuthPayload {
        token,
        user_id: user.id,
    })
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password.".to_string())
}

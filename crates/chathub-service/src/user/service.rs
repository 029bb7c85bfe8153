//! Account operations: registration, login, profile, and the user directory.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use validator::ValidateEmail;

use chathub_auth::jwt::JwtEncoder;
use chathub_auth::password::{PasswordHasher, PasswordValidator};
use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;
use chathub_database::ChatStore;
use chathub_entity::user::{CreateUser, UpdateUser, User, UserSummary};

use crate::context::RequestContext;

/// Token plus the user it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    /// Signed bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// Handles user accounts.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<dyn ChatStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        store: Arc<dyn ChatStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            store,
            hasher,
            validator,
            encoder,
        }
    }

    /// Registers an account and signs the user in.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<AuthResult> {
        let first_name = required(first_name, "First name")?;
        let last_name = required(last_name, "Last name")?;
        let email = normalize_email(email)?;
        self.validator.validate(password)?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::validation("User already exists"));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .store
            .create_user(CreateUser {
                first_name,
                last_name,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e.kind {
                // Lost a race with a concurrent registration.
                ErrorKind::Conflict => AppError::validation("User already exists"),
                _ => e,
            })?;

        info!(user_id = %user.id, "User registered");
        self.sign_in(user)
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResult> {
        let invalid = || AppError::validation("Invalid credentials");

        let user = self
            .store
            .find_by_email(email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        info!(user_id = %user.id, "User logged in");
        self.sign_in(user)
    }

    /// The current user's profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.store
            .find_by_id(ctx.user_id.into_uuid())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the current user's names and email.
    pub async fn update_profile(&self, ctx: &RequestContext, update: UpdateUser) -> AppResult<User> {
        let update = UpdateUser {
            first_name: update
                .first_name
                .map(|v| required(&v, "First name"))
                .transpose()?,
            last_name: update
                .last_name
                .map(|v| required(&v, "Last name"))
                .transpose()?,
            email: update.email.map(|v| normalize_email(&v)).transpose()?,
        };

        if update.is_empty() {
            return self.get_profile(ctx).await;
        }

        let user = self
            .store
            .update_profile(ctx.user_id.into_uuid(), update)
            .await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Every other user, sorted by first name.
    pub async fn list_others(&self, ctx: &RequestContext) -> AppResult<Vec<UserSummary>> {
        Ok(self
            .store
            .list_others(ctx.user_id.into_uuid())
            .await?
            .iter()
            .map(User::summary)
            .collect())
    }

    fn sign_in(&self, user: User) -> AppResult<AuthResult> {
        let token = self.encoder.issue(user.id, &user.email)?;
        Ok(AuthResult { token, user })
    }
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims an address and checks it with the same rules as `#[validate(email)]`.
fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_string();
    if !email.validate_email() {
        return Err(AppError::validation("A valid email is required"));
    }
    Ok(email)
}

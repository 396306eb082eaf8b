//! Registration, login and owner resolution.
//!
//! `AuthService` is the only place credentials are checked. Handlers hand it validated
//! request bodies; it talks to the [`UserStore`], the bcrypt helpers and the
//! [`TokenService`], and returns `AppError`s that already carry the right HTTP status.

use std::sync::Arc;

use validator::Validate;

use crate::auth::extractors::AuthContext;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenService;
use crate::auth::{LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{NewUser, User};
use crate::store::UserStore;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Verified against when the email is unknown, so that branch pays the bcrypt cost too.
const TIMING_PLACEHOLDER_PASSWORD: &str = "placeholder-password-for-unknown-accounts";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
    placeholder_hash: Option<Arc<str>>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        let placeholder_hash = match hash_password(TIMING_PLACEHOLDER_PASSWORD, bcrypt_cost) {
            Ok(hash) => Some(Arc::from(hash)),
            Err(e) => {
                log::warn!("could not prepare placeholder hash: {}", e);
                None
            }
        };

        Self {
            users,
            tokens,
            bcrypt_cost,
            placeholder_hash,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account. Fails with `Conflict` when the username or email is taken.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        let request = RegisterRequest {
            email: normalize_email(&request.email),
            ..request
        };
        request.validate()?;
        let email = request.email;

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        if self
            .users
            .find_user_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".into()));
        }

        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;

        // A concurrent registration can still win the race; the store reports that as
        // a conflict too.
        let user = self
            .users
            .create_user(NewUser {
                username: request.username,
                email,
                password_hash,
            })
            .await?;

        log::info!("registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Checks the credentials and issues a session token bound to the user's email.
    ///
    /// Malformed input, unknown email and wrong password all produce the same
    /// `Unauthorized` message.
    pub async fn login(&self, request: LoginRequest) -> Result<(User, String), AppError> {
        let request = LoginRequest {
            email: normalize_email(&request.email),
            ..request
        };
        if request.validate().is_err() {
            log::debug!("login rejected: malformed credentials");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        let email = &request.email;

        let user = match self.users.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                log::debug!("login rejected: no account for {}", email);
                if let Some(hash) = &self.placeholder_hash {
                    let _ = verify_password(&request.password, hash);
                }
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
            }
        };

        if !verify_password(&request.password, &user.password_hash)? {
            log::debug!("login rejected: wrong password for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = self.tokens.issue_session(&user.email)?;
        Ok((user, token))
    }

    /// Resolves the authenticated identity to its stored user.
    pub async fn current_user(&self, context: &AuthContext) -> Result<User, AppError> {
        self.users
            .find_user_by_email(&context.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))
    }
}

//! Registration, login and token issuing

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, LoginResponse, RegisterRequest, User, UserClaims, UserInfo},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a regular (non-staff) user
    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserInfo> {
        request.validate()?;

        let hash = hash_password(&request.password)?;
        let user = self.repository.users.create(request.username.trim(), &hash).await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user.into())
    }

    /// Authenticate user by username and return a JWT token
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;

        let user = self
            .repository
            .users
            .get_by_username(request.username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user, &request.password)? {
            tracing::warn!(user_id = user.id, "Failed login attempt");
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let expires_in = token_lifetime_secs(self.config.jwt_expiration_hours)?;
        let token = self.create_token(&user, expires_in)?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user: user.into(),
        })
    }

    fn create_token(&self, user: &User, expires_in: i64) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_staff: user.is_staff,
            exp: now
                .checked_add(expires_in)
                .ok_or_else(|| AppError::Internal("Token expiry overflows".to_string()))?,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Validate a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }
}

/// Token lifetime in seconds for a configured number of hours
fn token_lifetime_secs(hours: u64) -> AppResult<i64> {
    i64::try_from(hours)
        .ok()
        .and_then(|hours| hours.checked_mul(3600))
        .ok_or_else(|| {
            AppError::Internal(format!("jwt_expiration_hours {} is out of range", hours))
        })
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

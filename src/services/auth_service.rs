use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::api::dto::{LoginRequest, LoginResponse, UserDto};
use crate::auth::{decode_jwt, generate_jwt, hash_password, verify_password, AuthError, Claims};
use crate::cache::TokenStore;
use crate::config::AppConfig;
use crate::database::models::{NewUser, User};
use crate::database::UserStore;
use crate::services::ServiceError;
use crate::types::{now_millis, EntityStatus};

const BAD_CREDENTIALS: &str = "invalid username or password";

/// Login, session validation and token lifecycle
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<dyn TokenStore>, config: Arc<AppConfig>) -> Self {
        Self {
            users,
            tokens,
            config,
        }
    }

    fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.config.security.jwt_expiry_hours * 3600)
    }

    async fn issue(&self, user: &User) -> Result<String, ServiceError> {
        let claims = Claims::new(user.id, &user.username, self.config.security.jwt_expiry_hours);
        let token = generate_jwt(&claims, &self.config.security.jwt_secret)?;
        self.tokens.put(user.id, &token, self.token_ttl()).await;
        Ok(token)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let user = self
            .users
            .find_by_username(request.username.trim())
            .await?
            .ok_or_else(|| ServiceError::Validation(BAD_CREDENTIALS.into()))?;

        if !verify_password(&self.config.security.password_salt, &request.password, &user.password) {
            warn!("failed login for {}", user.username);
            return Err(ServiceError::Validation(BAD_CREDENTIALS.into()));
        }
        if !user.is_active() {
            return Err(ServiceError::Validation("user is disabled".into()));
        }

        let token = self.issue(&user).await?;
        self.users.touch_last_login(user.id, now_millis()).await?;
        info!("user {} signed in", user.username);

        Ok(LoginResponse {
            token,
            user: UserDto::from(&user),
        })
    }

    /// Resolves a bearer token to its user id. The token must verify and be
    /// the one currently stored for that user.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode_jwt(token, &self.config.security.jwt_secret)?;
        let uid = claims.uid()?;

        match self.tokens.get(uid).await {
            Some(current) if current == token => Ok(claims),
            _ => Err(AuthError::SessionExpired),
        }
    }

    pub async fn current_user(&self, uid: i64) -> Result<UserDto, ServiceError> {
        let user = self
            .users
            .find_by_id(uid)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".into()))?;
        Ok(UserDto::from(&user))
    }

    /// Replaces the stored token with a fresh one
    pub async fn refresh(&self, uid: i64) -> Result<String, ServiceError> {
        let user = self
            .users
            .find_by_id(uid)
            .await?
            .filter(|u| u.is_active())
            .ok_or_else(|| ServiceError::Unauthorized("user is not active".into()))?;
        self.issue(&user).await
    }

    pub async fn logout(&self, uid: i64) {
        self.tokens.remove(uid).await;
        info!("user {} signed out", uid);
    }

    /// Creates `admin` when no users exist and a bootstrap password is configured
    pub async fn bootstrap_admin(&self) -> Result<Option<User>, ServiceError> {
        let Some(password) = self.config.security.bootstrap_admin_password.as_deref() else {
            return Ok(None);
        };
        if self.users.count().await? > 0 {
            return Ok(None);
        }

        let user = self
            .users
            .create(NewUser {
                username: "admin".into(),
                password_hash: hash_password(&self.config.security.password_salt, password),
                email: None,
                phone: None,
                status: EntityStatus::Active,
            })
            .await?;
        info!("bootstrap admin account created");
        Ok(Some(user))
    }

    /// Registers an account with a hashed password
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                password_hash: hash_password(&self.config.security.password_salt, password),
                email: None,
                phone: None,
                status: EntityStatus::Active,
            })
            .await?;
        Ok(user)
    }
}

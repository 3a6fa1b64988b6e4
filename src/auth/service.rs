use crate::auth::password::PasswordHasher;
use crate::auth::token::{IssuedToken, TokenIssuer};
use crate::auth::types::{LoginRequest, SignupRequest};
use crate::config::Settings;
use crate::db::{NewUser, UserStore};
use crate::error::{AppError, AuthError, DatabaseError};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Result of a successful signup or login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub token: IssuedToken,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, issuer: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            issuer,
        }
    }

    pub fn from_settings(store: Arc<dyn UserStore>, settings: &Settings) -> Self {
        Self::new(
            store,
            PasswordHasher::new(settings.auth.bcrypt_cost),
            TokenIssuer::new(&settings.auth.jwt_secret, settings.auth.token_ttl_hours),
        )
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn signup(&self, req: SignupRequest) -> Result<Session, AppError> {
        req.validate()?;

        if self.store.find_by_email(&req.email).await?.is_some() {
            warn!("Signup rejected: email already registered");
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = self.hasher.hash(&req.password).await?;
        let user = self
            .store
            .create(NewUser {
                email: req.email,
                password_hash,
                name: Some(req.name),
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent signup for the same email
                DatabaseError::Duplicate => AppError::from(AuthError::DuplicateEmail),
                other => other.into(),
            })?;

        let token = self.issuer.issue(&user.email, user.id)?;
        info!(user_id = %user.id, "User registered");
        Ok(Session {
            user_id: user.id,
            token,
        })
    }

    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<Session, AppError> {
        req.validate()?;

        let user = match self.store.find_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                warn!("Login rejected: unknown email");
                return Err(AuthError::NotFound.into());
            }
        };

        if !self.hasher.verify(&req.password, &user.password_hash).await? {
            warn!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.issuer.issue(&user.email, user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok(Session {
            user_id: user.id,
            token,
        })
    }
}

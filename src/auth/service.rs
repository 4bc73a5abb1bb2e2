use crate::errors::{ServiceError, ServiceResult, DomainError, ValidationError};
use crate::auth::AuthContext;
use crate::domains::user::{User, NewUser, Credentials, UserRepository, SqliteUserRepository};
use crate::types::UserRole;
use crate::validation::Validate;
use argon2::{Argon2, PasswordHash, PasswordVerifier, PasswordHasher, password_hash::SaltString};
// Use the older rand version for compatibility with argon2
use rand_core::OsRng as ArgonOsRng;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Hash checked when no stored hash exists, so a miss costs one Argon2 run
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut ArgonOsRng);
    Argon2::default()
        .hash_password(b"not-a-real-password", &salt)
        .map(|h| h.to_string())
        .ok()
});

/// Explicit admin check used at privileged boundaries
pub fn is_admin(user: &User) -> bool {
    user.is_admin()
}

/// Auth service for handling user authentication and registration
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_repository(Arc::new(SqliteUserRepository::new(pool)))
    }

    pub fn with_repository(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Check a username/password pair. Unknown users and wrong passwords both
    /// yield `Ok(None)`; callers present them identically.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<Option<User>> {
        let credentials = Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        if credentials.validate().is_err() {
            return Ok(None);
        }

        let user = match self.user_repo.find_by_username(&credentials.username).await? {
            Some(user) => user,
            None => {
                log::warn!("Failed login for unknown user '{}'", credentials.username);
                self.burn_verification(&credentials.password);
                return Ok(None);
            }
        };

        let hash = match user.password_hash.as_deref() {
            Some(hash) => hash,
            None => {
                log::warn!("Failed login for '{}': account has no password set", user.username);
                self.burn_verification(&credentials.password);
                return Ok(None);
            }
        };

        match self.verify_password(&credentials.password, hash) {
            Ok(()) => {
                log::info!("User '{}' logged in", user.username);
                Ok(Some(user))
            }
            Err(ServiceError::Authentication(_)) => {
                log::warn!("Failed login for '{}': wrong password", user.username);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Register a new account from the registration form.
    /// Healthcare worker sign-up is open; creating an admin needs an admin actor.
    pub async fn register_user(&self, new_user: NewUser, actor: Option<&AuthContext>) -> ServiceResult<User> {
        new_user.validate()?;

        if new_user.parsed_role() == UserRole::Admin {
            match actor {
                Some(ctx) => ctx.authorize_admin()?,
                None => {
                    return Err(ServiceError::PermissionDenied(
                        "This action requires administrator privileges".to_string()
                    ))
                }
            }
        }

        let username = new_user.username.trim();
        let email = new_user.email.trim();

        // Friendly early checks; the unique constraints still guard the insert
        if !self.user_repo.is_username_unique(username).await? {
            log::warn!("Registration rejected: username '{}' is taken", username);
            return Err(ValidationError::unique("username").into());
        }
        if !self.user_repo.is_email_unique(email).await? {
            log::warn!("Registration rejected: email for '{}' is taken", username);
            return Err(ValidationError::unique("email").into());
        }

        let mut to_store = new_user.clone();
        to_store.password = self.hash_password(&new_user.password)?;
        to_store.password_confirm = String::new();

        let user = self.user_repo.create(&to_store).await?;
        log::info!("Registered user '{}' with role {}", user.username, user.role.as_str());
        Ok(user)
    }

    /// Create the bootstrap admin unless an account with that username exists.
    /// Returns the new account, or `None` when nothing was created.
    pub async fn ensure_admin(&self, username: &str, email: &str, password: &str) -> ServiceResult<Option<User>> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            log::info!("Admin user '{}' already exists", username);
            return Ok(None);
        }

        let system = AuthContext::internal_system_context();
        let admin = NewUser::new(username, email, password, UserRole::Admin);
        self.register_user(admin, Some(&system)).await.map(Some)
    }

    /// Generate a hash for a new password
    pub fn hash_password(&self, password: &str) -> ServiceResult<String> {
        let mut rng = ArgonOsRng;
        let salt = SaltString::generate(&mut rng);

        // Configure Argon2 with default parameters
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServiceError::Domain(DomainError::Internal(format!("Failed to hash password: {}", e))))?
            .to_string();

        Ok(password_hash)
    }

    fn burn_verification(&self, password: &str) {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = self.verify_password(password, hash);
        }
    }

    /// Verify a password against a hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<(), ServiceError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| ServiceError::Domain(DomainError::Internal("Invalid password hash format".to_string())))?;

        Argon2::default().verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| ServiceError::Authentication("Invalid password".to_string()))
    }
}

use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{Validate, ValidationBuilder};
use crate::types::UserRole;
use serde::{Serialize, Deserialize};
use sqlx::FromRow;

/// Core User entity - a healthcare worker or administrator account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub role: UserRole,
}

impl User {
    // Helper to check if user is admin
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// NewUser DTO - the registration form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String, // Plain text password (will be hashed)
    pub password_confirm: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    UserRole::HealthcareWorker.as_str().to_string()
}

impl NewUser {
    pub fn new(username: &str, email: &str, password: &str, role: UserRole) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirm: password.to_string(),
            role: role.as_str().to_string(),
        }
    }

    /// Role after validation; unknown strings were already rejected
    pub fn parsed_role(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or_default()
    }
}

impl Validate for NewUser {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("username", Some(self.username.trim().to_string()))
            .required()
            .min_length(3)
            .max_length(64)
            .validate()?;

        ValidationBuilder::new("email", Some(self.email.trim().to_string()))
            .required()
            .email()
            .max_length(120)
            .validate()?;

        ValidationBuilder::new("password", Some(self.password.clone()))
            .required()
            .min_length(6)
            .validate()?;

        if self.password_confirm != self.password {
            return Err(DomainError::Validation(ValidationError::invalid_value(
                "password_confirm",
                "Field must be equal to password",
            )));
        }

        ValidationBuilder::new("role", Some(self.role.clone()))
            .required()
            .one_of(&UserRole::ALL, Some("Invalid role"))
            .validate()?;

        Ok(())
    }
}

/// Credentials DTO - used for login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("username", Some(self.username.clone()))
            .required()
            .validate()?;

        ValidationBuilder::new("password", Some(self.password.clone()))
            .required()
            .validate()?;

        Ok(())
    }
}

/// UserRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: String,
}

impl UserRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<User> {
        Ok(User {
            id: self.id,
            role: UserRole::from_str(&self.role)
                .ok_or_else(|| DomainError::Internal(format!("Invalid role: {}", self.role)))?,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> NewUser {
        NewUser::new("nurse_asha", "asha@clinic.org", "secret1", UserRole::HealthcareWorker)
    }

    #[test]
    fn test_valid_registration() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn test_registration_rules() {
        let mut short_name = registration();
        short_name.username = "ab".to_string();
        assert!(matches!(
            short_name.validate(),
            Err(DomainError::Validation(ValidationError::MinLength { .. }))
        ));

        let mut bad_email = registration();
        bad_email.email = "asha@clinic".to_string();
        assert!(matches!(
            bad_email.validate(),
            Err(DomainError::Validation(ValidationError::Format { .. }))
        ));

        let mut short_password = registration();
        short_password.password = "12345".to_string();
        short_password.password_confirm = "12345".to_string();
        assert!(short_password.validate().is_err());

        let mut mismatch = registration();
        mismatch.password_confirm = "secret2".to_string();
        match mismatch.validate() {
            Err(DomainError::Validation(e)) => assert_eq!(e.field(), Some("password_confirm")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let mut bad_role = registration();
        bad_role.role = "superuser".to_string();
        assert!(bad_role.validate().is_err());
    }

    #[test]
    fn test_row_into_entity() {
        let row = UserRow {
            id: 7,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: None,
            role: "admin".to_string(),
        };
        let user = row.into_entity().unwrap();
        assert!(user.is_admin());

        let bad = UserRow {
            id: 8,
            username: "x".to_string(),
            email: "x@example.com".to_string(),
            password_hash: None,
            role: "field".to_string(),
        };
        assert!(bad.into_entity().is_err());
    }
}

use crate::types::{UserRole, Permission};
use crate::errors::ServiceError;
use crate::domains::user::User;

/// Represents the authentication context for the current operation
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The ID of the authenticated user
    pub user_id: i64,

    /// Username, kept for log lines
    pub username: String,

    /// The role of the authenticated user
    pub role: UserRole,
}

impl AuthContext {
    /// Create a new authentication context
    pub fn new(user_id: i64, username: &str, role: UserRole) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            role,
        }
    }

    /// Context for an account returned by `AuthService::authenticate`
    pub fn from_user(user: &User) -> Self {
        Self::new(user.id, &user.username, user.role)
    }

    /// Create a new authentication context for internal system operations
    pub fn internal_system_context() -> Self {
        Self {
            user_id: 0,
            username: "system".to_string(),
            role: UserRole::Admin, // System operations usually have admin privileges
        }
    }

    /// Check if user has a specific permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    /// Authorize a specific permission, returning an error if not allowed
    pub fn authorize(&self, permission: Permission) -> Result<(), ServiceError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            log::warn!("User '{}' denied permission {}", self.username, permission.as_str());
            Err(ServiceError::PermissionDenied(format!(
                "User does not have permission: {:?}",
                permission
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Verify user is an admin, i.e. may manage user accounts
    pub fn authorize_admin(&self) -> Result<(), ServiceError> {
        if self.has_permission(Permission::ManageUsers) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "This action requires administrator privileges".to_string()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_permissions() {
        let ctx = AuthContext::new(2, "asha", UserRole::HealthcareWorker);
        assert!(ctx.authorize(Permission::CreateRecords).is_ok());
        assert!(ctx.authorize(Permission::ViewAnalytics).is_ok());
        assert!(matches!(
            ctx.authorize(Permission::ManageUsers),
            Err(ServiceError::PermissionDenied(_))
        ));
        assert!(ctx.authorize_admin().is_err());
    }

    #[test]
    fn test_admin_and_system_context() {
        let admin = AuthContext::new(1, "admin", UserRole::Admin);
        assert!(admin.authorize_admin().is_ok());
        assert!(admin.authorize(Permission::ManageUsers).is_ok());
        assert!(AuthContext::internal_system_context().is_admin());
    }
}

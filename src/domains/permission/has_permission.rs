use serde::{Deserialize, Serialize};

// --- User Role Definition ---

/// UserRole enum for authorization in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    HealthcareWorker,
}

// --- Permission Enum Definition ---

/// Permission enum representing individual permissions in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // User management
    ManageUsers,

    // Migrant record permissions
    ViewRecords,
    CreateRecords,
    EditRecords,

    // Dashboard
    ViewAnalytics,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::HealthcareWorker
    }
}

impl UserRole {
    pub const ALL: [&'static str; 2] = ["admin", "healthcare_worker"];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::HealthcareWorker => "healthcare_worker",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "healthcare_worker" => Some(UserRole::HealthcareWorker),
            _ => None,
        }
    }

    /// Check if the role grants a specific permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            UserRole::Admin => true, // Admin has all permissions
            UserRole::HealthcareWorker => match permission {
                Permission::ManageUsers => false,

                Permission::ViewRecords
                | Permission::CreateRecords
                | Permission::EditRecords
                | Permission::ViewAnalytics => true,
            },
        }
    }
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::ViewRecords => "view_records",
            Permission::CreateRecords => "create_records",
            Permission::EditRecords => "edit_records",
            Permission::ViewAnalytics => "view_analytics",
        }
    }
}

// Re-export UserRole and Permission from the permission module
pub use crate::domains::permission::{UserRole, Permission};

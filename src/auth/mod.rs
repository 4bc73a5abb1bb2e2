pub mod context;
pub mod service;

// Re-export public items
pub use context::AuthContext;
pub use service::{AuthService, is_admin};

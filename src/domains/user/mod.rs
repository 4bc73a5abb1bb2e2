pub mod types;
pub mod repository;

// Re-export main items for other domains to use
pub use types::{User, NewUser, Credentials};
pub use repository::{UserRepository, SqliteUserRepository};

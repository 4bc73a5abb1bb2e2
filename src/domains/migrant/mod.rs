pub mod types;
pub mod repository;
pub mod service;

pub use types::{Migrant, NewMigrant, UpdateMigrant, MigrantFilter, FilterBy, calculate_bmi};
pub use repository::{MigrantRepository, SqliteMigrantRepository};
pub use service::{MigrantService, MigrantServiceImpl};

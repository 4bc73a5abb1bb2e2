pub mod analytics;
pub mod migrant;
pub mod permission;
pub mod user;

pub use user::User;
pub use migrant::Migrant;

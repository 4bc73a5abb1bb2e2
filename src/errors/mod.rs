//! Error layers: `DbError` from storage, `DomainError` from repositories and
//! validation, `ServiceError` at the service boundary.
mod error;

pub use error::{DomainError, DbError, ServiceError, ValidationError};

pub type DbResult<T> = Result<T, DbError>;

pub type DomainResult<T> = Result<T, DomainError>;

pub type ServiceResult<T> = Result<T, ServiceError>;

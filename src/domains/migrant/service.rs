use crate::auth::AuthContext;
use crate::domains::migrant::repository::{MigrantRepository, SqliteMigrantRepository};
use crate::domains::migrant::types::{Migrant, MigrantFilter, NewMigrant, UpdateMigrant};
use crate::domains::permission::Permission;
use crate::errors::{DomainError, ServiceError, ServiceResult};
use crate::validation::Validate;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Trait defining migrant record service operations
#[async_trait]
pub trait MigrantService: Send + Sync {
    async fn create_migrant(&self, form: NewMigrant, auth: &AuthContext) -> ServiceResult<Migrant>;

    async fn get_migrant_by_id(&self, id: i64, auth: &AuthContext) -> ServiceResult<Migrant>;

    /// Replace a record's form fields; BMI is recomputed from the new values
    async fn update_migrant(&self, id: i64, form: UpdateMigrant, auth: &AuthContext) -> ServiceResult<Migrant>;

    async fn search_migrants(&self, filter: &MigrantFilter, auth: &AuthContext) -> ServiceResult<Vec<Migrant>>;

    /// QR text for a stored record
    async fn qr_payload(&self, id: i64, auth: &AuthContext) -> ServiceResult<String>;
}

/// Implementation of the migrant service
#[derive(Clone)]
pub struct MigrantServiceImpl {
    repo: Arc<dyn MigrantRepository>,
    public_base_url: Option<String>,
}

impl MigrantServiceImpl {
    pub fn new(pool: SqlitePool, public_base_url: Option<String>) -> Self {
        Self::with_repository(Arc::new(SqliteMigrantRepository::new(pool)), public_base_url)
    }

    pub fn with_repository(repo: Arc<dyn MigrantRepository>, public_base_url: Option<String>) -> Self {
        Self { repo, public_base_url }
    }

    fn prepare(form: NewMigrant) -> ServiceResult<(NewMigrant, Option<f64>)> {
        let form = form.normalized();
        form.validate()?;
        let bmi = form.bmi();
        Ok((form, bmi))
    }

    fn log_rejection(action: &str, err: &DomainError) {
        if let DomainError::Validation(v) = err {
            log::warn!("{} rejected: {}", action, v);
        }
    }
}

#[async_trait]
impl MigrantService for MigrantServiceImpl {
    async fn create_migrant(&self, form: NewMigrant, auth: &AuthContext) -> ServiceResult<Migrant> {
        auth.authorize(Permission::CreateRecords)?;
        let (form, bmi) = Self::prepare(form)?;

        let migrant = self.repo.create(&form, bmi).await.map_err(|e| {
            Self::log_rejection("Migrant create", &e);
            ServiceError::Domain(e)
        })?;

        log::info!("User '{}' added migrant record {}", auth.username, migrant.id);
        Ok(migrant)
    }

    async fn get_migrant_by_id(&self, id: i64, auth: &AuthContext) -> ServiceResult<Migrant> {
        auth.authorize(Permission::ViewRecords)?;
        Ok(self.repo.find_by_id(id).await?)
    }

    async fn update_migrant(&self, id: i64, form: UpdateMigrant, auth: &AuthContext) -> ServiceResult<Migrant> {
        auth.authorize(Permission::EditRecords)?;
        let (form, bmi) = Self::prepare(form)?;

        let migrant = self.repo.update(id, &form, bmi).await.map_err(|e| {
            Self::log_rejection("Migrant update", &e);
            ServiceError::Domain(e)
        })?;

        log::info!("User '{}' updated migrant record {}", auth.username, migrant.id);
        Ok(migrant)
    }

    async fn search_migrants(&self, filter: &MigrantFilter, auth: &AuthContext) -> ServiceResult<Vec<Migrant>> {
        auth.authorize(Permission::ViewRecords)?;
        Ok(self.repo.search(filter).await?)
    }

    async fn qr_payload(&self, id: i64, auth: &AuthContext) -> ServiceResult<String> {
        let migrant = self.get_migrant_by_id(id, auth).await?;
        Ok(migrant.qr_payload(self.public_base_url.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_migration::test_pool;
    use crate::errors::ValidationError;
    use crate::types::UserRole;

    fn worker() -> AuthContext {
        AuthContext::new(2, "asha", UserRole::HealthcareWorker)
    }

    async fn service(base_url: Option<&str>) -> MigrantServiceImpl {
        MigrantServiceImpl::new(test_pool().await, base_url.map(str::to_string))
    }

    #[tokio::test]
    async fn test_create_computes_bmi_and_clears_blanks() {
        let svc = service(None).await;
        let mut form = NewMigrant::new("Ravi Kumar", 30, "Male", "9876543210");
        form.height = Some(170.0);
        form.weight = Some(70.0);
        form.aadhaar_passport = Some("   ".to_string());

        let created = svc.create_migrant(form, &worker()).await.unwrap();
        assert_eq!(created.bmi, Some(24.22));
        assert_eq!(created.aadhaar_passport, None);
    }

    #[tokio::test]
    async fn test_update_recomputes_and_clears_bmi() {
        let svc = service(None).await;
        let mut form = NewMigrant::new("Ravi Kumar", 30, "Male", "9876543210");
        form.height = Some(170.0);
        form.weight = Some(70.0);
        let created = svc.create_migrant(form.clone(), &worker()).await.unwrap();

        form.weight = Some(80.0);
        let heavier = svc.update_migrant(created.id, form.clone(), &worker()).await.unwrap();
        assert_eq!(heavier.bmi, Some(27.68));

        form.height = None;
        let cleared = svc.update_migrant(created.id, form, &worker()).await.unwrap();
        assert_eq!(cleared.bmi, None);
    }

    #[tokio::test]
    async fn test_invalid_form_persists_nothing() {
        let svc = service(None).await;
        let form = NewMigrant::new("R", 30, "Male", "9876543210");
        match svc.create_migrant(form, &worker()).await {
            Err(ServiceError::Domain(DomainError::Validation(ValidationError::MinLength { field, .. }))) => {
                assert_eq!(field, "name")
            }
            other => panic!("expected name validation error, got {:?}", other),
        }
        assert!(svc.search_migrants(&MigrantFilter::new(), &worker()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let svc = service(None).await;
        let err = svc.get_migrant_by_id(404, &worker()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(svc.qr_payload(404, &worker()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_qr_payload_uses_configured_base_url() {
        let svc = service(Some("https://records.example.org")).await;
        let created = svc
            .create_migrant(NewMigrant::new("Ravi Kumar", 30, "Male", "9876543210"), &worker())
            .await
            .unwrap();

        let payload = svc.qr_payload(created.id, &worker()).await.unwrap();
        assert!(payload.starts_with(&format!("ID: {}\nName: Ravi Kumar\nAge: 30\nGender: Male", created.id)));
        assert!(payload.ends_with(&format!("\n\nView full record: https://records.example.org/view/{}", created.id)));
    }
}

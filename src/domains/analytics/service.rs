use crate::auth::AuthContext;
use crate::domains::analytics::repository::{AnalyticsRepository, SqliteAnalyticsRepository};
use crate::domains::analytics::types::{AnalyticsSnapshot, Distribution, AGE_BANDS, TOP_N};
use crate::domains::permission::Permission;
use crate::errors::ServiceResult;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Dashboard aggregation
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    async fn compute_analytics(&self, auth: &AuthContext) -> ServiceResult<AnalyticsSnapshot>;
}

#[derive(Clone)]
pub struct AnalyticsServiceImpl {
    repo: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsServiceImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_repository(Arc::new(SqliteAnalyticsRepository::new(pool)))
    }

    pub fn with_repository(repo: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repo }
    }

    async fn age_bands(&self) -> ServiceResult<Distribution> {
        let mut dist = Distribution::new();
        for (label, min, max) in AGE_BANDS {
            let count = self.repo.count_age_between(min, max).await?;
            dist.labels.push(label.to_string());
            dist.data.push(count);
        }
        Ok(dist)
    }
}

#[async_trait]
impl AnalyticsService for AnalyticsServiceImpl {
    /// Reads are not isolated from concurrent writes; figures may be a
    /// moment apart from each other.
    async fn compute_analytics(&self, auth: &AuthContext) -> ServiceResult<AnalyticsSnapshot> {
        auth.authorize(Permission::ViewAnalytics)?;

        let total_migrants = self.repo.count_total().await?;
        if total_migrants == 0 {
            log::debug!("No migrant records; returning empty analytics");
            return Ok(AnalyticsSnapshot::default());
        }

        let snapshot = AnalyticsSnapshot {
            total_migrants,
            gender: Distribution::from_grouped(self.repo.count_by_gender().await?),
            nationality: Distribution::from_grouped(self.repo.top_nationalities(TOP_N).await?),
            health_condition: Distribution::from_grouped(self.repo.count_by_health_condition().await?),
            age_bands: self.age_bands().await?,
            occupation: Distribution::from_grouped(self.repo.top_occupations(TOP_N).await?),
        };

        log::debug!("Computed analytics over {} records", total_migrants);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_migration::test_pool;
    use crate::types::UserRole;
    use sqlx::SqlitePool;

    fn worker() -> AuthContext {
        AuthContext::new(2, "asha", UserRole::HealthcareWorker)
    }

    async fn insert(pool: &SqlitePool, age: i64, gender: &str, nationality: Option<&str>, occupation: Option<&str>) {
        sqlx::query(
            "INSERT INTO migrants (name, age, gender, contact, nationality, occupation) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind("Test Person")
        .bind(age)
        .bind(gender)
        .bind("9000000000")
        .bind(nationality)
        .bind(occupation)
        .execute(pool)
        .await
        .unwrap();
    }

    fn assert_non_increasing(dist: &Distribution) {
        assert!(dist.len() <= 5);
        assert_eq!(dist.labels.len(), dist.data.len());
        assert!(dist.data.windows(2).all(|w| w[0] >= w[1]), "not sorted: {:?}", dist);
    }

    #[tokio::test]
    async fn test_empty_store_gives_empty_snapshot() {
        let svc = AnalyticsServiceImpl::new(test_pool().await);
        let snapshot = svc.compute_analytics(&worker()).await.unwrap();
        assert_eq!(snapshot.total_migrants, 0);
        assert!(snapshot.gender.is_empty());
        assert!(snapshot.nationality.is_empty());
        assert!(snapshot.health_condition.is_empty());
        assert!(snapshot.age_bands.is_empty());
        assert!(snapshot.occupation.is_empty());
    }

    #[tokio::test]
    async fn test_gender_distribution_with_unknown() {
        let pool = test_pool().await;
        insert(&pool, 30, "Male", None, None).await;
        insert(&pool, 30, "Female", None, None).await;
        insert(&pool, 30, "Female", None, None).await;
        insert(&pool, 30, "", None, None).await;

        let svc = AnalyticsServiceImpl::new(pool);
        let snapshot = svc.compute_analytics(&worker()).await.unwrap();
        assert_eq!(snapshot.total_migrants, 4);
        assert_eq!(snapshot.gender.len(), 3);
        assert_eq!(snapshot.gender.get("Male"), Some(1));
        assert_eq!(snapshot.gender.get("Female"), Some(2));
        assert_eq!(snapshot.gender.get("Unknown"), Some(1));

        // No health conditions recorded at all
        assert_eq!(snapshot.health_condition.labels, vec!["Unknown".to_string()]);
        assert_eq!(snapshot.health_condition.data, vec![4]);
    }

    #[tokio::test]
    async fn test_age_band_boundaries_and_partition() {
        let pool = test_pool().await;
        for age in [0, 18, 19, 30, 31, 45, 46, 60, 61, 200] {
            insert(&pool, age, "Male", None, None).await;
        }

        let svc = AnalyticsServiceImpl::new(pool);
        let snapshot = svc.compute_analytics(&worker()).await.unwrap();
        let bands = &snapshot.age_bands;
        assert_eq!(bands.labels, vec!["0-18", "19-30", "31-45", "46-60", "60+"]);
        assert_eq!(bands.data, vec![2, 2, 2, 2, 2]);
        assert_eq!(bands.total(), snapshot.total_migrants);
    }

    #[tokio::test]
    async fn test_sixty_is_not_in_sixty_plus() {
        let pool = test_pool().await;
        insert(&pool, 60, "Male", None, None).await;
        let svc = AnalyticsServiceImpl::new(pool.clone());
        let snapshot = svc.compute_analytics(&worker()).await.unwrap();
        assert_eq!(snapshot.age_bands.get("60+"), Some(0));
        assert_eq!(snapshot.age_bands.get("46-60"), Some(1));

        insert(&pool, 61, "Male", None, None).await;
        let snapshot = svc.compute_analytics(&worker()).await.unwrap();
        assert_eq!(snapshot.age_bands.get("60+"), Some(1));
    }

    #[tokio::test]
    async fn test_top_five_nationalities_and_occupations() {
        let pool = test_pool().await;
        let nationalities = [
            ("Indian", 5), ("Nepali", 4), ("Bangladeshi", 3), ("Burmese", 2),
            ("Sri Lankan", 2), ("Bhutanese", 1), ("Tibetan", 1),
        ];
        for (nationality, n) in nationalities {
            for _ in 0..n {
                insert(&pool, 25, "Male", Some(nationality), Some("Mason")).await;
            }
        }
        insert(&pool, 25, "Male", None, Some("")).await;
        insert(&pool, 25, "Male", None, Some("Cook")).await;

        let svc = AnalyticsServiceImpl::new(pool);
        let snapshot = svc.compute_analytics(&worker()).await.unwrap();

        assert_non_increasing(&snapshot.nationality);
        assert_eq!(
            snapshot.nationality.labels,
            vec!["Indian", "Nepali", "Bangladeshi", "Burmese", "Sri Lankan"]
        );
        assert_eq!(snapshot.nationality.data, vec![5, 4, 3, 2, 2]);

        assert_non_increasing(&snapshot.occupation);
        assert_eq!(snapshot.occupation.labels, vec!["Mason", "Cook", "Unknown"]);
        assert_eq!(snapshot.occupation.data, vec![18, 1, 1]);
    }

    #[tokio::test]
    async fn test_every_role_can_view_analytics() {
        let svc = AnalyticsServiceImpl::new(test_pool().await);
        for role in [UserRole::Admin, UserRole::HealthcareWorker] {
            assert!(role.has_permission(Permission::ViewAnalytics));
            let ctx = AuthContext::new(1, "someone", role);
            assert!(svc.compute_analytics(&ctx).await.is_ok());
        }
    }
}

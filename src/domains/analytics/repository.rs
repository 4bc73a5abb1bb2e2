use crate::errors::{DbError, DomainResult};
use async_trait::async_trait;
use sqlx::{query_as, query_scalar, SqlitePool};

/// Read-only aggregate queries over the migrants table
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn count_total(&self) -> DomainResult<i64>;

    async fn count_by_gender(&self) -> DomainResult<Vec<(Option<String>, i64)>>;

    async fn count_by_health_condition(&self) -> DomainResult<Vec<(Option<String>, i64)>>;

    /// Most common nationalities, count descending then label ascending
    async fn top_nationalities(&self, limit: i64) -> DomainResult<Vec<(Option<String>, i64)>>;

    /// Most common occupations, count descending then label ascending
    async fn top_occupations(&self, limit: i64) -> DomainResult<Vec<(Option<String>, i64)>>;

    /// Records with `min <= age <= max`
    async fn count_age_between(&self, min: i64, max: i64) -> DomainResult<i64>;
}

pub struct SqliteAnalyticsRepository {
    pool: SqlitePool,
}

impl SqliteAnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Blank and NULL values share the "Unknown" group. `column` is always a
    /// compile-time constant, never user input.
    async fn grouped(&self, column: &str, ranked_limit: Option<i64>) -> DomainResult<Vec<(Option<String>, i64)>> {
        let label = format!("COALESCE(NULLIF(TRIM({}), ''), 'Unknown')", column);
        let sql = match ranked_limit {
            Some(limit) => format!(
                "SELECT {label} AS label, COUNT(*) AS count FROM migrants \
                 GROUP BY label ORDER BY count DESC, label ASC LIMIT {limit}"
            ),
            None => format!(
                "SELECT {label} AS label, COUNT(*) AS count FROM migrants \
                 GROUP BY label ORDER BY label ASC"
            ),
        };

        let counts = query_as::<_, (Option<String>, i64)>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(counts)
    }
}

#[async_trait]
impl AnalyticsRepository for SqliteAnalyticsRepository {
    async fn count_total(&self) -> DomainResult<i64> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM migrants")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(total)
    }

    async fn count_by_gender(&self) -> DomainResult<Vec<(Option<String>, i64)>> {
        self.grouped("gender", None).await
    }

    async fn count_by_health_condition(&self) -> DomainResult<Vec<(Option<String>, i64)>> {
        self.grouped("health_condition", None).await
    }

    async fn top_nationalities(&self, limit: i64) -> DomainResult<Vec<(Option<String>, i64)>> {
        self.grouped("nationality", Some(limit)).await
    }

    async fn top_occupations(&self, limit: i64) -> DomainResult<Vec<(Option<String>, i64)>> {
        self.grouped("occupation", Some(limit)).await
    }

    async fn count_age_between(&self, min: i64, max: i64) -> DomainResult<i64> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM migrants WHERE age BETWEEN ? AND ?")
            .bind(min)
            .bind(max)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(count)
    }
}

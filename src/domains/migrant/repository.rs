use crate::domains::migrant::types::{Migrant, MigrantRow, NewMigrant, MigrantFilter, SearchCriteria, DATE_FORMAT};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{query, query_as, QueryBuilder, Sqlite, SqlitePool};

/// Columns written from the record form, in bind order
const FORM_COLUMNS: [&str; 46] = [
    "name", "date_of_birth", "age", "gender", "nationality", "state_of_origin", "contact",
    "emergency_contact_name", "emergency_contact_number", "aadhaar_passport",
    "preferred_language", "literacy_level", "data_sharing_consent",
    "occupation", "employer_name", "employer_contact", "work_location_district",
    "work_location_pincode", "duration_of_stay", "living_conditions",
    "allergies", "past_medical_conditions", "past_surgical_history", "family_history",
    "immunization_status",
    "height", "weight", "bmi", "blood_group", "vital_signs", "current_medications",
    "ongoing_treatment", "infectious_disease_screening", "health_condition",
    "last_checkup", "healthcare_facility", "doctor_name", "symptoms", "diagnosis",
    "prescriptions", "lab_results", "vaccination_records",
    "disease_alerts", "contact_tracing_info", "referral_notes", "follow_up_date",
];

static INSERT_SQL: Lazy<String> = Lazy::new(|| {
    format!(
        "INSERT INTO migrants ({}) VALUES ({})",
        FORM_COLUMNS.join(", "),
        vec!["?"; FORM_COLUMNS.len()].join(", ")
    )
});

static UPDATE_SQL: Lazy<String> = Lazy::new(|| {
    let assignments: Vec<String> = FORM_COLUMNS.iter().map(|c| format!("{} = ?", c)).collect();
    format!("UPDATE migrants SET {} WHERE id = ?", assignments.join(", "))
});

/// Trait defining migrant repository operations
#[async_trait]
pub trait MigrantRepository: Send + Sync {
    /// Insert a validated, normalized form. `bmi` is stored as given.
    async fn create(&self, form: &NewMigrant, bmi: Option<f64>) -> DomainResult<Migrant>;

    /// Overwrite every form column of an existing record
    async fn update(&self, id: i64, form: &NewMigrant, bmi: Option<f64>) -> DomainResult<Migrant>;

    async fn find_by_id(&self, id: i64) -> DomainResult<Migrant>;

    /// Matching records, newest first
    async fn search(&self, filter: &MigrantFilter) -> DomainResult<Vec<Migrant>>;
}

/// SQLite implementation for MigrantRepository
#[derive(Debug, Clone)]
pub struct SqliteMigrantRepository {
    pool: SqlitePool,
}

impl SqliteMigrantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: MigrantRow) -> DomainResult<Migrant> {
        row.into_entity()
    }
}

fn date_text(date: &Option<chrono::NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// Bind form values in `FORM_COLUMNS` order
fn bind_form<'q>(
    q: Query<'q, Sqlite, SqliteArguments<'q>>,
    form: &'q NewMigrant,
    bmi: Option<f64>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    q.bind(&form.name)
        .bind(date_text(&form.date_of_birth))
        .bind(form.age)
        .bind(&form.gender)
        .bind(&form.nationality)
        .bind(&form.state_of_origin)
        .bind(&form.contact)
        .bind(&form.emergency_contact_name)
        .bind(&form.emergency_contact_number)
        .bind(&form.aadhaar_passport)
        .bind(&form.preferred_language)
        .bind(&form.literacy_level)
        .bind(form.data_sharing_consent as i64)
        .bind(&form.occupation)
        .bind(&form.employer_name)
        .bind(&form.employer_contact)
        .bind(&form.work_location_district)
        .bind(&form.work_location_pincode)
        .bind(&form.duration_of_stay)
        .bind(&form.living_conditions)
        .bind(&form.allergies)
        .bind(&form.past_medical_conditions)
        .bind(&form.past_surgical_history)
        .bind(&form.family_history)
        .bind(&form.immunization_status)
        .bind(form.height)
        .bind(form.weight)
        .bind(bmi)
        .bind(&form.blood_group)
        .bind(&form.vital_signs)
        .bind(&form.current_medications)
        .bind(&form.ongoing_treatment)
        .bind(&form.infectious_disease_screening)
        .bind(&form.health_condition)
        .bind(date_text(&form.last_checkup))
        .bind(&form.healthcare_facility)
        .bind(&form.doctor_name)
        .bind(&form.symptoms)
        .bind(&form.diagnosis)
        .bind(&form.prescriptions)
        .bind(&form.lab_results)
        .bind(&form.vaccination_records)
        .bind(&form.disease_alerts)
        .bind(&form.contact_tracing_info)
        .bind(&form.referral_notes)
        .bind(date_text(&form.follow_up_date))
}

#[async_trait]
impl MigrantRepository for SqliteMigrantRepository {
    async fn create(&self, form: &NewMigrant, bmi: Option<f64>) -> DomainResult<Migrant> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let result = bind_form(query(INSERT_SQL.as_str()), form, bmi)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                tx.commit().await.map_err(DbError::from)?;
                self.find_by_id(id).await
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(DomainError::from_write(e))
            }
        }
    }

    async fn update(&self, id: i64, form: &NewMigrant, bmi: Option<f64>) -> DomainResult<Migrant> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let result = bind_form(query(UPDATE_SQL.as_str()), form, bmi)
            .bind(id)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                let _ = tx.rollback().await;
                Err(DomainError::EntityNotFound("Migrant".to_string(), id))
            }
            Ok(_) => {
                tx.commit().await.map_err(DbError::from)?;
                self.find_by_id(id).await
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(DomainError::from_write(e))
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Migrant> {
        let row = query_as::<_, MigrantRow>("SELECT * FROM migrants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Migrant".to_string(), id))?;

        Self::map_row(row)
    }

    async fn search(&self, filter: &MigrantFilter) -> DomainResult<Vec<Migrant>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM migrants");

        match filter.criteria() {
            SearchCriteria::All => {}
            SearchCriteria::Nothing => return Ok(Vec::new()),
            SearchCriteria::Id(id) => {
                builder.push(" WHERE id = ");
                builder.push_bind(id);
            }
            SearchCriteria::Contains(column, term) => {
                // SQLite LIKE is case-insensitive for ASCII
                builder.push(format!(" WHERE {} LIKE ", column.as_str()));
                builder.push_bind(format!("%{}%", term));
            }
        }
        builder.push(" ORDER BY id DESC");

        log::debug!("Migrant search: {}", builder.sql());

        let rows = builder
            .build_query_as::<MigrantRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        rows.into_iter().map(Self::map_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_migration::test_pool;
    use crate::errors::ValidationError;
    use chrono::NaiveDate;

    fn full_form() -> NewMigrant {
        NewMigrant {
            name: "Lakshmi Das".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1991, 3, 14),
            age: Some(34),
            gender: "Female".to_string(),
            nationality: Some("Indian".to_string()),
            state_of_origin: Some("West Bengal".to_string()),
            contact: "9000012345".to_string(),
            emergency_contact_name: Some("Anil Das".to_string()),
            emergency_contact_number: Some("9000054321".to_string()),
            aadhaar_passport: Some("1234-5678-9012".to_string()),
            preferred_language: Some("Bengali".to_string()),
            literacy_level: Some("Basic".to_string()),
            data_sharing_consent: true,
            occupation: Some("Construction Worker".to_string()),
            employer_name: Some("Kerala Builders".to_string()),
            employer_contact: Some("0484000000".to_string()),
            work_location_district: Some("Ernakulam".to_string()),
            work_location_pincode: Some("682001".to_string()),
            duration_of_stay: Some("2 years".to_string()),
            living_conditions: Some("Camp".to_string()),
            allergies: Some("Penicillin".to_string()),
            past_medical_conditions: Some("Malaria 2021".to_string()),
            past_surgical_history: Some("None".to_string()),
            family_history: Some("Hypertension".to_string()),
            immunization_status: Some("Complete".to_string()),
            height: Some(155.0),
            weight: Some(52.5),
            blood_group: Some("B+".to_string()),
            vital_signs: Some("BP 120/80, Pulse 72".to_string()),
            current_medications: Some("Iron supplements".to_string()),
            ongoing_treatment: Some("Anaemia follow-up".to_string()),
            infectious_disease_screening: Some("TB negative".to_string()),
            health_condition: Some("Anaemic".to_string()),
            last_checkup: NaiveDate::from_ymd_opt(2025, 5, 2),
            healthcare_facility: Some("PHC Aluva".to_string()),
            doctor_name: Some("Dr. Menon".to_string()),
            symptoms: Some("Fatigue".to_string()),
            diagnosis: Some("Iron deficiency".to_string()),
            prescriptions: Some("Ferrous sulphate".to_string()),
            lab_results: Some("Hb 9.8".to_string()),
            vaccination_records: Some("Td 2024".to_string()),
            disease_alerts: Some("None".to_string()),
            contact_tracing_info: Some("N/A".to_string()),
            referral_notes: Some("Refer to district hospital if Hb < 8".to_string()),
            follow_up_date: NaiveDate::from_ymd_opt(2025, 6, 2),
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_every_column() {
        let repo = SqliteMigrantRepository::new(test_pool().await);
        let form = full_form();
        let bmi = form.bmi();

        let created = repo.create(&form, bmi).await.unwrap();
        let fetched = repo.find_by_id(created.id).await.unwrap();

        // Every form column comes back exactly as submitted
        assert_eq!(NewMigrant::from(&fetched), form);
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.bmi, Some(21.85));
        assert_eq!(fetched.qr_code, None);
    }

    #[tokio::test]
    async fn test_duplicate_national_id_rolls_back() {
        let repo = SqliteMigrantRepository::new(test_pool().await);
        let form = full_form();
        repo.create(&form, None).await.unwrap();

        let mut second = full_form();
        second.name = "Someone Else".to_string();
        let err = repo.create(&second, None).await.unwrap_err();
        match err {
            DomainError::Validation(ValidationError::Unique { field }) => assert_eq!(field, "aadhaar_passport"),
            other => panic!("expected unique violation, got {:?}", other),
        }

        let all = repo.search(&MigrantFilter::new()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_records_without_national_id_do_not_collide() {
        let repo = SqliteMigrantRepository::new(test_pool().await);
        let form = NewMigrant::new("Ravi Kumar", 30, "Male", "9876543210");
        repo.create(&form, None).await.unwrap();
        repo.create(&form, None).await.unwrap();
        assert_eq!(repo.search(&MigrantFilter::new()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_missing_record() {
        let repo = SqliteMigrantRepository::new(test_pool().await);
        let created = repo.create(&full_form(), Some(21.85)).await.unwrap();

        let mut edit = full_form();
        edit.weight = None;
        edit.health_condition = Some("Recovered".to_string());
        let updated = repo.update(created.id, &edit, None).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.weight, None);
        assert_eq!(updated.bmi, None);
        assert_eq!(updated.health_condition.as_deref(), Some("Recovered"));

        assert!(repo.update(999, &edit, None).await.unwrap_err().is_not_found());
        assert!(repo.find_by_id(999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_search_filters() {
        let repo = SqliteMigrantRepository::new(test_pool().await);
        let ravi = repo.create(&NewMigrant::new("Ravi Kumar", 30, "Male", "9876543210"), None).await.unwrap();
        let mut form = NewMigrant::new("Sita Devi", 25, "Female", "9123456780");
        form.health_condition = Some("Diabetic".to_string());
        let sita = repo.create(&form, None).await.unwrap();

        let all = repo.search(&MigrantFilter::new()).await.unwrap();
        assert_eq!(all.iter().map(|m| m.id).collect::<Vec<_>>(), vec![sita.id, ravi.id]);

        let by_name = repo
            .search(&MigrantFilter::new().with_search_term("RAVI").with_filter_by("name"))
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, ravi.id);

        // "male" is a substring of "Female"
        let by_gender = repo
            .search(&MigrantFilter::new().with_search_term("male").with_filter_by("gender"))
            .await
            .unwrap();
        assert_eq!(by_gender.len(), 2);

        let by_health = repo
            .search(&MigrantFilter::new().with_search_term("diab").with_filter_by("health_condition"))
            .await
            .unwrap();
        assert_eq!(by_health.len(), 1);

        let by_contact = repo
            .search(&MigrantFilter::new().with_search_term("3456").with_filter_by("contact"))
            .await
            .unwrap();
        assert_eq!(by_contact[0].id, sita.id);

        let by_id = repo
            .search(&MigrantFilter::new().with_search_term(&ravi.id.to_string()).with_filter_by("id"))
            .await
            .unwrap();
        assert_eq!(by_id.len(), 1);

        let bad_id = repo
            .search(&MigrantFilter::new().with_search_term("abc").with_filter_by("id"))
            .await
            .unwrap();
        assert!(bad_id.is_empty());
    }
}

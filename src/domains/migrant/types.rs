use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{Validate, ValidationBuilder, optional_text, optional_choice, normalize_text};
use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use sqlx::FromRow;
use std::str::FromStr;

pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
pub const PREFERRED_LANGUAGES: [&str; 7] = ["English", "Malayalam", "Hindi", "Bengali", "Tamil", "Odiya", "Other"];
pub const LITERACY_LEVELS: [&str; 4] = ["Illiterate", "Basic", "Intermediate", "Advanced"];
pub const LIVING_CONDITIONS: [&str; 5] = ["Hostel", "Shared Housing", "Camp", "Individual Rental", "Other"];
pub const BLOOD_GROUPS: [&str; 9] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-", "Unknown"];

/// Dates are stored as ISO text
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body mass index from height in centimetres and weight in kilograms,
/// rounded to two decimals. Absent unless both inputs are present and height > 0.
pub fn calculate_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<f64> {
    match (height_cm, weight_kg) {
        (Some(h), Some(w)) if h > 0.0 => {
            let height_m = h / 100.0;
            round_2(w / (height_m * height_m))
        }
        _ => None,
    }
}

/// Two-decimal rounding of the exact binary value, ties to even.
/// Scaling by 100 first would shift values that sit just below a tie.
fn round_2(value: f64) -> Option<f64> {
    format!("{:.2}", value).parse::<f64>().ok()
}

/// Core Migrant entity - one health record per person
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Migrant {
    pub id: i64,

    // Personal
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: i64,
    pub gender: String,
    pub nationality: Option<String>,
    pub state_of_origin: Option<String>,
    pub contact: String,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub aadhaar_passport: Option<String>,
    pub preferred_language: Option<String>,
    pub literacy_level: Option<String>,
    pub data_sharing_consent: bool,

    // Work
    pub occupation: Option<String>,
    pub employer_name: Option<String>,
    pub employer_contact: Option<String>,
    pub work_location_district: Option<String>,
    pub work_location_pincode: Option<String>,
    pub duration_of_stay: Option<String>,
    pub living_conditions: Option<String>,

    // Health history
    pub allergies: Option<String>,
    pub past_medical_conditions: Option<String>,
    pub past_surgical_history: Option<String>,
    pub family_history: Option<String>,
    pub immunization_status: Option<String>,

    // Current status
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub blood_group: Option<String>,
    pub vital_signs: Option<String>,
    pub current_medications: Option<String>,
    pub ongoing_treatment: Option<String>,
    pub infectious_disease_screening: Option<String>,
    pub health_condition: Option<String>,

    // Visit
    pub last_checkup: Option<NaiveDate>,
    pub healthcare_facility: Option<String>,
    pub doctor_name: Option<String>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions: Option<String>,
    pub lab_results: Option<String>,
    pub vaccination_records: Option<String>,

    // Surveillance
    pub disease_alerts: Option<String>,
    pub contact_tracing_info: Option<String>,
    pub referral_notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub qr_code: Option<String>,
}

impl Migrant {
    /// Text encoded into the record's QR code. The view link is only
    /// appended when the deployment has a public base URL.
    pub fn qr_payload(&self, base_url: Option<&str>) -> String {
        let mut payload = format!(
            "ID: {}\nName: {}\nAge: {}\nGender: {}",
            self.id, self.name, self.age, self.gender
        );

        if !self.contact.is_empty() {
            payload.push_str(&format!("\nContact: {}", self.contact));
        }
        if let Some(condition) = self.health_condition.as_deref().filter(|s| !s.is_empty()) {
            payload.push_str(&format!("\nHealth Status: {}", condition));
        }
        if let Some(group) = self.blood_group.as_deref().filter(|s| !s.is_empty()) {
            payload.push_str(&format!("\nBlood Group: {}", group));
        }

        if let Some(base) = base_url.map(|b| b.trim_end_matches('/')).filter(|b| !b.is_empty()) {
            payload.push_str(&format!("\n\nView full record: {}/view/{}", base, self.id));
        }

        payload
    }
}

/// NewMigrant DTO - the submitted record form. Edits submit the full form
/// again, so the same shape serves both create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMigrant {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i64>,
    pub gender: String,
    pub nationality: Option<String>,
    pub state_of_origin: Option<String>,
    pub contact: String,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub aadhaar_passport: Option<String>,
    pub preferred_language: Option<String>,
    pub literacy_level: Option<String>,
    #[serde(default)]
    pub data_sharing_consent: bool,

    pub occupation: Option<String>,
    pub employer_name: Option<String>,
    pub employer_contact: Option<String>,
    pub work_location_district: Option<String>,
    pub work_location_pincode: Option<String>,
    pub duration_of_stay: Option<String>,
    pub living_conditions: Option<String>,

    pub allergies: Option<String>,
    pub past_medical_conditions: Option<String>,
    pub past_surgical_history: Option<String>,
    pub family_history: Option<String>,
    pub immunization_status: Option<String>,

    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_group: Option<String>,
    pub vital_signs: Option<String>,
    pub current_medications: Option<String>,
    pub ongoing_treatment: Option<String>,
    pub infectious_disease_screening: Option<String>,
    pub health_condition: Option<String>,

    pub last_checkup: Option<NaiveDate>,
    pub healthcare_facility: Option<String>,
    pub doctor_name: Option<String>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions: Option<String>,
    pub lab_results: Option<String>,
    pub vaccination_records: Option<String>,

    pub disease_alerts: Option<String>,
    pub contact_tracing_info: Option<String>,
    pub referral_notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

/// Edits resubmit the whole form
pub type UpdateMigrant = NewMigrant;

/// Edit form prefilled from a stored record
impl From<&Migrant> for NewMigrant {
    fn from(m: &Migrant) -> Self {
        Self {
            name: m.name.clone(),
            date_of_birth: m.date_of_birth,
            age: Some(m.age),
            gender: m.gender.clone(),
            nationality: m.nationality.clone(),
            state_of_origin: m.state_of_origin.clone(),
            contact: m.contact.clone(),
            emergency_contact_name: m.emergency_contact_name.clone(),
            emergency_contact_number: m.emergency_contact_number.clone(),
            aadhaar_passport: m.aadhaar_passport.clone(),
            preferred_language: m.preferred_language.clone(),
            literacy_level: m.literacy_level.clone(),
            data_sharing_consent: m.data_sharing_consent,
            occupation: m.occupation.clone(),
            employer_name: m.employer_name.clone(),
            employer_contact: m.employer_contact.clone(),
            work_location_district: m.work_location_district.clone(),
            work_location_pincode: m.work_location_pincode.clone(),
            duration_of_stay: m.duration_of_stay.clone(),
            living_conditions: m.living_conditions.clone(),
            allergies: m.allergies.clone(),
            past_medical_conditions: m.past_medical_conditions.clone(),
            past_surgical_history: m.past_surgical_history.clone(),
            family_history: m.family_history.clone(),
            immunization_status: m.immunization_status.clone(),
            height: m.height,
            weight: m.weight,
            blood_group: m.blood_group.clone(),
            vital_signs: m.vital_signs.clone(),
            current_medications: m.current_medications.clone(),
            ongoing_treatment: m.ongoing_treatment.clone(),
            infectious_disease_screening: m.infectious_disease_screening.clone(),
            health_condition: m.health_condition.clone(),
            last_checkup: m.last_checkup,
            healthcare_facility: m.healthcare_facility.clone(),
            doctor_name: m.doctor_name.clone(),
            symptoms: m.symptoms.clone(),
            diagnosis: m.diagnosis.clone(),
            prescriptions: m.prescriptions.clone(),
            lab_results: m.lab_results.clone(),
            vaccination_records: m.vaccination_records.clone(),
            disease_alerts: m.disease_alerts.clone(),
            contact_tracing_info: m.contact_tracing_info.clone(),
            referral_notes: m.referral_notes.clone(),
            follow_up_date: m.follow_up_date,
        }
    }
}

impl NewMigrant {
    /// Minimal valid form, mostly for callers filling fields incrementally
    pub fn new(name: &str, age: i64, gender: &str, contact: &str) -> Self {
        Self {
            name: name.to_string(),
            age: Some(age),
            gender: gender.to_string(),
            contact: contact.to_string(),
            ..Default::default()
        }
    }

    /// Trim every text field and turn blank optional input into absent values
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            gender: self.gender.trim().to_string(),
            contact: self.contact.trim().to_string(),
            nationality: normalize_text(self.nationality),
            state_of_origin: normalize_text(self.state_of_origin),
            emergency_contact_name: normalize_text(self.emergency_contact_name),
            emergency_contact_number: normalize_text(self.emergency_contact_number),
            aadhaar_passport: normalize_text(self.aadhaar_passport),
            preferred_language: normalize_text(self.preferred_language),
            literacy_level: normalize_text(self.literacy_level),
            occupation: normalize_text(self.occupation),
            employer_name: normalize_text(self.employer_name),
            employer_contact: normalize_text(self.employer_contact),
            work_location_district: normalize_text(self.work_location_district),
            work_location_pincode: normalize_text(self.work_location_pincode),
            duration_of_stay: normalize_text(self.duration_of_stay),
            living_conditions: normalize_text(self.living_conditions),
            allergies: normalize_text(self.allergies),
            past_medical_conditions: normalize_text(self.past_medical_conditions),
            past_surgical_history: normalize_text(self.past_surgical_history),
            family_history: normalize_text(self.family_history),
            immunization_status: normalize_text(self.immunization_status),
            blood_group: normalize_text(self.blood_group),
            vital_signs: normalize_text(self.vital_signs),
            current_medications: normalize_text(self.current_medications),
            ongoing_treatment: normalize_text(self.ongoing_treatment),
            infectious_disease_screening: normalize_text(self.infectious_disease_screening),
            health_condition: normalize_text(self.health_condition),
            healthcare_facility: normalize_text(self.healthcare_facility),
            doctor_name: normalize_text(self.doctor_name),
            symptoms: normalize_text(self.symptoms),
            diagnosis: normalize_text(self.diagnosis),
            prescriptions: normalize_text(self.prescriptions),
            lab_results: normalize_text(self.lab_results),
            vaccination_records: normalize_text(self.vaccination_records),
            disease_alerts: normalize_text(self.disease_alerts),
            contact_tracing_info: normalize_text(self.contact_tracing_info),
            referral_notes: normalize_text(self.referral_notes),
            ..self
        }
    }

    /// Derived BMI for the submitted height and weight
    pub fn bmi(&self) -> Option<f64> {
        calculate_bmi(self.height, self.weight)
    }
}

impl Validate for NewMigrant {
    fn validate(&self) -> DomainResult<()> {
        // Personal
        ValidationBuilder::new("name", Some(self.name.clone()))
            .required()
            .min_length(2)
            .max_length(100)
            .validate()?;

        ValidationBuilder::new("age", self.age)
            .present()
            .range(0, 200)
            .validate()?;

        ValidationBuilder::new("gender", Some(self.gender.clone()))
            .required()
            .one_of(&GENDERS, Some("Not a valid choice"))
            .validate()?;

        optional_text("nationality", &self.nationality, 50)?;
        optional_text("state_of_origin", &self.state_of_origin, 50)?;

        ValidationBuilder::new("contact", Some(self.contact.clone()))
            .required()
            .min_length(5)
            .max_length(20)
            .validate()?;

        optional_text("emergency_contact_name", &self.emergency_contact_name, 100)?;
        optional_text("emergency_contact_number", &self.emergency_contact_number, 20)?;
        optional_text("aadhaar_passport", &self.aadhaar_passport, 50)?;
        optional_choice("preferred_language", &self.preferred_language, &PREFERRED_LANGUAGES)?;
        optional_choice("literacy_level", &self.literacy_level, &LITERACY_LEVELS)?;

        // Work
        optional_text("occupation", &self.occupation, 100)?;
        optional_text("employer_name", &self.employer_name, 100)?;
        optional_text("employer_contact", &self.employer_contact, 20)?;
        optional_text("work_location_district", &self.work_location_district, 50)?;
        optional_text("work_location_pincode", &self.work_location_pincode, 10)?;
        optional_text("duration_of_stay", &self.duration_of_stay, 50)?;
        optional_choice("living_conditions", &self.living_conditions, &LIVING_CONDITIONS)?;

        // Health history
        optional_text("allergies", &self.allergies, 500)?;
        optional_text("past_medical_conditions", &self.past_medical_conditions, 500)?;
        optional_text("past_surgical_history", &self.past_surgical_history, 500)?;
        optional_text("family_history", &self.family_history, 500)?;
        optional_text("immunization_status", &self.immunization_status, 500)?;

        // Current status
        ValidationBuilder::new("height", self.height)
            .validate_with(|h| non_negative("height", *h))
            .validate()?;
        ValidationBuilder::new("weight", self.weight)
            .validate_with(|w| non_negative("weight", *w))
            .validate()?;
        optional_choice("blood_group", &self.blood_group, &BLOOD_GROUPS)?;
        optional_text("current_medications", &self.current_medications, 500)?;
        optional_text("ongoing_treatment", &self.ongoing_treatment, 500)?;
        optional_text("infectious_disease_screening", &self.infectious_disease_screening, 500)?;
        optional_text("health_condition", &self.health_condition, 200)?;

        // Visit
        optional_text("healthcare_facility", &self.healthcare_facility, 100)?;
        optional_text("doctor_name", &self.doctor_name, 100)?;
        optional_text("symptoms", &self.symptoms, 500)?;
        optional_text("diagnosis", &self.diagnosis, 500)?;
        optional_text("prescriptions", &self.prescriptions, 500)?;
        optional_text("lab_results", &self.lab_results, 500)?;
        optional_text("vaccination_records", &self.vaccination_records, 500)?;

        // Surveillance
        optional_text("disease_alerts", &self.disease_alerts, 500)?;
        optional_text("contact_tracing_info", &self.contact_tracing_info, 500)?;
        optional_text("referral_notes", &self.referral_notes, 500)?;

        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::invalid_value(field, "must be a non-negative number"))
    }
}

/// Which column a search term is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterBy {
    Name,
    Gender,
    HealthCondition,
    Contact,
    Id,
}

impl FromStr for FilterBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FilterBy::Name),
            "gender" => Ok(FilterBy::Gender),
            "health_condition" => Ok(FilterBy::HealthCondition),
            "contact" => Ok(FilterBy::Contact),
            "id" => Ok(FilterBy::Id),
            other => Err(ValidationError::invalid_value(
                "filter_by",
                &format!("unknown search field '{}'", other),
            )),
        }
    }
}

impl FilterBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterBy::Name => "name",
            FilterBy::Gender => "gender",
            FilterBy::HealthCondition => "health_condition",
            FilterBy::Contact => "contact",
            FilterBy::Id => "id",
        }
    }
}

/// Search input as submitted: `?q=...&by=...`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrantFilter {
    pub search_term: Option<String>,
    pub filter_by: Option<String>,
}

/// What a filter resolves to once parsed
#[derive(Debug, Clone, PartialEq)]
pub enum SearchCriteria {
    /// No restriction
    All,
    /// Case-insensitive substring match on one column
    Contains(FilterBy, String),
    /// Exact id match
    Id(i64),
    /// Malformed input that can match nothing
    Nothing,
}

impl MigrantFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_term(mut self, term: &str) -> Self {
        self.search_term = Some(term.to_string());
        self
    }

    pub fn with_filter_by(mut self, filter_by: &str) -> Self {
        self.filter_by = Some(filter_by.to_string());
        self
    }

    /// Empty terms and unknown keys apply no filter; an id that does not
    /// parse matches nothing rather than failing.
    pub fn criteria(&self) -> SearchCriteria {
        let term = match self.search_term.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return SearchCriteria::All,
        };

        match self.filter_by.as_deref().and_then(|key| key.parse::<FilterBy>().ok()) {
            None => SearchCriteria::All,
            Some(FilterBy::Id) => match term.trim().parse::<i64>() {
                Ok(id) => SearchCriteria::Id(id),
                Err(_) => SearchCriteria::Nothing,
            },
            Some(column) => SearchCriteria::Contains(column, term.to_string()),
        }
    }
}

/// MigrantRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct MigrantRow {
    pub id: i64,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub age: i64,
    pub gender: String,
    pub nationality: Option<String>,
    pub state_of_origin: Option<String>,
    pub contact: String,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub aadhaar_passport: Option<String>,
    pub preferred_language: Option<String>,
    pub literacy_level: Option<String>,
    pub data_sharing_consent: i64,
    pub occupation: Option<String>,
    pub employer_name: Option<String>,
    pub employer_contact: Option<String>,
    pub work_location_district: Option<String>,
    pub work_location_pincode: Option<String>,
    pub duration_of_stay: Option<String>,
    pub living_conditions: Option<String>,
    pub allergies: Option<String>,
    pub past_medical_conditions: Option<String>,
    pub past_surgical_history: Option<String>,
    pub family_history: Option<String>,
    pub immunization_status: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub blood_group: Option<String>,
    pub vital_signs: Option<String>,
    pub current_medications: Option<String>,
    pub ongoing_treatment: Option<String>,
    pub infectious_disease_screening: Option<String>,
    pub health_condition: Option<String>,
    pub last_checkup: Option<String>,
    pub healthcare_facility: Option<String>,
    pub doctor_name: Option<String>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions: Option<String>,
    pub lab_results: Option<String>,
    pub vaccination_records: Option<String>,
    pub disease_alerts: Option<String>,
    pub contact_tracing_info: Option<String>,
    pub referral_notes: Option<String>,
    pub follow_up_date: Option<String>,
    pub qr_code: Option<String>,
}

impl MigrantRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Migrant> {
        let parse_date = |field: &str, value: Option<String>| -> DomainResult<Option<NaiveDate>> {
            value
                .map(|s| {
                    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|_| {
                        DomainError::Internal(format!("Invalid date in {}: {}", field, s))
                    })
                })
                .transpose()
        };

        Ok(Migrant {
            id: self.id,
            date_of_birth: parse_date("date_of_birth", self.date_of_birth)?,
            last_checkup: parse_date("last_checkup", self.last_checkup)?,
            follow_up_date: parse_date("follow_up_date", self.follow_up_date)?,
            name: self.name,
            age: self.age,
            gender: self.gender,
            nationality: self.nationality,
            state_of_origin: self.state_of_origin,
            contact: self.contact,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_number: self.emergency_contact_number,
            aadhaar_passport: self.aadhaar_passport,
            preferred_language: self.preferred_language,
            literacy_level: self.literacy_level,
            data_sharing_consent: self.data_sharing_consent != 0,
            occupation: self.occupation,
            employer_name: self.employer_name,
            employer_contact: self.employer_contact,
            work_location_district: self.work_location_district,
            work_location_pincode: self.work_location_pincode,
            duration_of_stay: self.duration_of_stay,
            living_conditions: self.living_conditions,
            allergies: self.allergies,
            past_medical_conditions: self.past_medical_conditions,
            past_surgical_history: self.past_surgical_history,
            family_history: self.family_history,
            immunization_status: self.immunization_status,
            height: self.height,
            weight: self.weight,
            bmi: self.bmi,
            blood_group: self.blood_group,
            vital_signs: self.vital_signs,
            current_medications: self.current_medications,
            ongoing_treatment: self.ongoing_treatment,
            infectious_disease_screening: self.infectious_disease_screening,
            health_condition: self.health_condition,
            healthcare_facility: self.healthcare_facility,
            doctor_name: self.doctor_name,
            symptoms: self.symptoms,
            diagnosis: self.diagnosis,
            prescriptions: self.prescriptions,
            lab_results: self.lab_results,
            vaccination_records: self.vaccination_records,
            disease_alerts: self.disease_alerts,
            contact_tracing_info: self.contact_tracing_info,
            referral_notes: self.referral_notes,
            qr_code: self.qr_code,
        })
    }
}

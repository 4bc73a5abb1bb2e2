use serde::{Serialize, Deserialize};

/// Label used for records with no value in the grouped column
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Number of entries kept in ranked distributions
pub const TOP_N: i64 = 5;

/// Fixed, inclusive age bands. `60+` starts at 61.
pub const AGE_BANDS: [(&str, i64, i64); 5] = [
    ("0-18", 0, 18),
    ("19-30", 19, 30),
    ("31-45", 31, 45),
    ("46-60", 46, 60),
    ("60+", 61, 200),
];

/// Chart-ready distribution: parallel label and value lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from grouped counts, mapping a missing or blank group to "Unknown".
    /// Groups that end up with the same label are merged in first-seen position.
    pub fn from_grouped(rows: Vec<(Option<String>, i64)>) -> Self {
        let mut dist = Self::new();
        for (label, count) in rows {
            let label = label
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
            dist.add(label, count);
        }
        dist
    }

    fn add(&mut self, label: String, count: i64) {
        match self.labels.iter().position(|l| *l == label) {
            Some(i) => self.data[i] += count,
            None => {
                self.labels.push(label);
                self.data.push(count);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> i64 {
        self.data.iter().sum()
    }

    /// Count recorded for a label, if present
    pub fn get(&self, label: &str) -> Option<i64> {
        self.labels.iter().position(|l| l == label).map(|i| self.data[i])
    }
}

/// Dashboard aggregates over every migrant record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub total_migrants: i64,
    pub gender: Distribution,
    /// Top nationalities by count
    pub nationality: Distribution,
    pub health_condition: Distribution,
    pub age_bands: Distribution,
    /// Top occupations by count
    pub occupation: Distribution,
}

//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical record for both ancestors and living members.
//! - Provide validation and derived views (years, gender, living state).
//!
//! # Invariants
//! - `id` is non-blank and stable for the person's lifetime.
//! - `father_id`, `mother_id` and `spouse_id` never point at the person itself.
//! - Reference targets are not required to exist.

use crate::model::role::{Gender, RelationRole};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Soft reference id shared by persons and their relationship fields.
pub type PersonId = String;

static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})\b").expect("year pattern is a valid regex"));

/// Which input collection a person came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Historical record from the ancestors collection.
    Ancestor,
    /// Living-app member from the family-members collection.
    Member,
}

/// Vital status as recorded by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeStatus {
    Living,
    Deceased,
}

/// Which relationship field a soft reference lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceField {
    Father,
    Mother,
    Spouse,
}

impl Display for ReferenceField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Father => write!(f, "father_id"),
            Self::Mother => write!(f, "mother_id"),
            Self::Spouse => write!(f, "spouse_id"),
        }
    }
}

/// Validation failures for person records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// `id` is empty after trim.
    EmptyId,
    /// `name` is empty after trim.
    BlankName,
    /// A relationship field points at the person itself.
    SelfReference { field: ReferenceField },
    /// `father_id` and `mother_id` name the same person.
    ParentsIdentical,
    /// Death year precedes birth year.
    DeathBeforeBirth { birth_year: i32, death_year: i32 },
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "person id must not be blank"),
            Self::BlankName => write!(f, "person name must not be blank"),
            Self::SelfReference { field } => {
                write!(f, "{field} must not reference the person itself")
            }
            Self::ParentsIdentical => {
                write!(f, "father_id and mother_id must reference different persons")
            }
            Self::DeathBeforeBirth {
                birth_year,
                death_year,
            } => write!(
                f,
                "death year {death_year} is earlier than birth year {birth_year}"
            ),
        }
    }
}

impl Error for PersonValidationError {}

/// Canonical family record.
///
/// Ancestors and living members share this shape; the collection they came
/// from is tracked separately as an [`Origin`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub role: RelationRole,
    /// Explicit gender; falls back to the role's implied gender when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_id: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_id: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LifeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_issues: Option<String>,
}

impl Person {
    /// Creates a person with a generated UUID v4 id.
    pub fn new(name: impl Into<String>, role: RelationRole) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, role)
    }

    /// Creates a person with a caller-provided id.
    ///
    /// Used by import/sync paths where the document id already exists.
    /// This constructor does not validate.
    pub fn with_id(id: impl Into<PersonId>, name: impl Into<String>, role: RelationRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            ..Self::default()
        }
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.id.trim().is_empty() {
            return Err(PersonValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(PersonValidationError::BlankName);
        }

        for (field, target) in self.references() {
            if target == self.id {
                return Err(PersonValidationError::SelfReference { field });
            }
        }

        if let (Some(father), Some(mother)) = (&self.father_id, &self.mother_id) {
            if father == mother {
                return Err(PersonValidationError::ParentsIdentical);
            }
        }

        if let (Some(birth_year), Some(death_year)) = (self.birth_year(), self.death_year()) {
            if death_year < birth_year {
                return Err(PersonValidationError::DeathBeforeBirth {
                    birth_year,
                    death_year,
                });
            }
        }

        Ok(())
    }

    /// Non-empty relationship references in `father`, `mother`, `spouse` order.
    pub fn references(&self) -> impl Iterator<Item = (ReferenceField, &str)> {
        [
            (ReferenceField::Father, self.father_id.as_deref()),
            (ReferenceField::Mother, self.mother_id.as_deref()),
            (ReferenceField::Spouse, self.spouse_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, target)| {
            target
                .filter(|value| !value.trim().is_empty())
                .map(|value| (field, value))
        })
    }

    /// Year extracted from `birth_date`, if it contains a four-digit year.
    pub fn birth_year(&self) -> Option<i32> {
        self.birth_date.as_deref().and_then(extract_year)
    }

    /// Year extracted from `death_date`, if it contains a four-digit year.
    pub fn death_year(&self) -> Option<i32> {
        self.death_date.as_deref().and_then(extract_year)
    }

    /// Explicit gender, else the role's implied gender, else `Unknown`.
    pub fn effective_gender(&self) -> Gender {
        match self.gender {
            Some(gender) if gender != Gender::Unknown => gender,
            _ => self.role.implied_gender().unwrap_or(Gender::Unknown),
        }
    }

    /// Whether this person should be shown as living.
    ///
    /// Explicit status wins; without one, a recorded death date means deceased.
    pub fn is_living(&self) -> bool {
        match self.status {
            Some(LifeStatus::Living) => true,
            Some(LifeStatus::Deceased) => false,
            None => self
                .death_date
                .as_deref()
                .map_or(true, |value| value.trim().is_empty()),
        }
    }

    /// Short lifespan label such as `1920 - 1998` or `b. 1990`.
    pub fn life_span_label(&self) -> Option<String> {
        match (self.birth_year(), self.death_year()) {
            (Some(birth), Some(death)) => Some(format!("{birth} - {death}")),
            (Some(birth), None) => Some(format!("b. {birth}")),
            (None, Some(death)) => Some(format!("d. {death}")),
            (None, None) => None,
        }
    }
}

/// Extracts the first standalone four-digit year from a free date string.
///
/// Accepts `1960-01-01`, `03/12/1955`, `c. 1890`, `1955`.
pub fn extract_year(value: &str) -> Option<i32> {
    YEAR_PATTERN
        .captures(value)
        .and_then(|captures| captures.get(1))
        .and_then(|year| year.as_str().parse().ok())
}

//! Relation roles and gender.
//!
//! # Responsibility
//! - Enumerate the relation roles a person can hold relative to the family's
//!   reference person.
//! - Map each role to a generation offset and an implied gender.
//!
//! # Invariants
//! - Offsets are relative to the reference person: negative is older.
//! - `Other` never carries a generation offset or gender.
//! - Labels round-trip: `from_label(role.label()) == role` for every role.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Gender used for icon selection and parent-slot inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

/// Relation of a person to the family's reference person.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationRole {
    /// The reference person ("Me").
    SelfPerson,
    Spouse,
    Father,
    Mother,
    Parent,
    Stepfather,
    Stepmother,
    Grandfather,
    Grandmother,
    Grandparent,
    GreatGrandfather,
    GreatGrandmother,
    GreatGrandparent,
    Son,
    Daughter,
    Child,
    Grandson,
    Granddaughter,
    Grandchild,
    Brother,
    Sister,
    Sibling,
    Uncle,
    Aunt,
    Cousin,
    Nephew,
    Niece,
    /// Free-form label imported from a legacy record.
    Other(String),
}

const KNOWN_ROLES: &[RelationRole] = &[
    RelationRole::SelfPerson,
    RelationRole::Spouse,
    RelationRole::Father,
    RelationRole::Mother,
    RelationRole::Parent,
    RelationRole::Stepfather,
    RelationRole::Stepmother,
    RelationRole::Grandfather,
    RelationRole::Grandmother,
    RelationRole::Grandparent,
    RelationRole::GreatGrandfather,
    RelationRole::GreatGrandmother,
    RelationRole::GreatGrandparent,
    RelationRole::Son,
    RelationRole::Daughter,
    RelationRole::Child,
    RelationRole::Grandson,
    RelationRole::Granddaughter,
    RelationRole::Grandchild,
    RelationRole::Brother,
    RelationRole::Sister,
    RelationRole::Sibling,
    RelationRole::Uncle,
    RelationRole::Aunt,
    RelationRole::Cousin,
    RelationRole::Nephew,
    RelationRole::Niece,
];

impl RelationRole {
    /// Returns every role with a fixed label, in declaration order.
    pub fn known() -> &'static [RelationRole] {
        KNOWN_ROLES
    }

    /// Canonical display label, also used as the wire value.
    pub fn label(&self) -> &str {
        match self {
            Self::SelfPerson => "Self",
            Self::Spouse => "Spouse",
            Self::Father => "Father",
            Self::Mother => "Mother",
            Self::Parent => "Parent",
            Self::Stepfather => "Stepfather",
            Self::Stepmother => "Stepmother",
            Self::Grandfather => "Grandfather",
            Self::Grandmother => "Grandmother",
            Self::Grandparent => "Grandparent",
            Self::GreatGrandfather => "Great-Grandfather",
            Self::GreatGrandmother => "Great-Grandmother",
            Self::GreatGrandparent => "Great-Grandparent",
            Self::Son => "Son",
            Self::Daughter => "Daughter",
            Self::Child => "Child",
            Self::Grandson => "Grandson",
            Self::Granddaughter => "Granddaughter",
            Self::Grandchild => "Grandchild",
            Self::Brother => "Brother",
            Self::Sister => "Sister",
            Self::Sibling => "Sibling",
            Self::Uncle => "Uncle",
            Self::Aunt => "Aunt",
            Self::Cousin => "Cousin",
            Self::Nephew => "Nephew",
            Self::Niece => "Niece",
            Self::Other(label) => label.as_str(),
        }
    }

    /// Parses a label by exact match against canonical names and aliases.
    ///
    /// Matching ignores case, surrounding whitespace, and the separator
    /// between words (`great grandmother`, `Great-Grandmother` and
    /// `GreatGrandmother` are equal). Anything else becomes `Other`, with
    /// the trimmed original label preserved.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        let key: String = trimmed
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "self" | "me" | "myself" => Self::SelfPerson,
            "spouse" | "wife" | "husband" | "partner" => Self::Spouse,
            "father" | "dad" | "papa" => Self::Father,
            "mother" | "mom" | "mum" | "mama" => Self::Mother,
            "parent" => Self::Parent,
            "stepfather" => Self::Stepfather,
            "stepmother" => Self::Stepmother,
            "grandfather" | "grandpa" => Self::Grandfather,
            "grandmother" | "grandma" => Self::Grandmother,
            "grandparent" => Self::Grandparent,
            "greatgrandfather" => Self::GreatGrandfather,
            "greatgrandmother" => Self::GreatGrandmother,
            "greatgrandparent" => Self::GreatGrandparent,
            "son" => Self::Son,
            "daughter" => Self::Daughter,
            "child" => Self::Child,
            "grandson" => Self::Grandson,
            "granddaughter" => Self::Granddaughter,
            "grandchild" => Self::Grandchild,
            "brother" => Self::Brother,
            "sister" => Self::Sister,
            "sibling" => Self::Sibling,
            "uncle" => Self::Uncle,
            "aunt" => Self::Aunt,
            "cousin" => Self::Cousin,
            "nephew" => Self::Nephew,
            "niece" => Self::Niece,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Generation offset relative to the reference person.
    ///
    /// Returns `None` for `Other`, which leaves tiering to birth years.
    pub fn generation_offset(&self) -> Option<i32> {
        let offset = match self {
            Self::GreatGrandfather | Self::GreatGrandmother | Self::GreatGrandparent => -3,
            Self::Grandfather | Self::Grandmother | Self::Grandparent => -2,
            Self::Father
            | Self::Mother
            | Self::Parent
            | Self::Stepfather
            | Self::Stepmother
            | Self::Uncle
            | Self::Aunt => -1,
            Self::SelfPerson
            | Self::Spouse
            | Self::Brother
            | Self::Sister
            | Self::Sibling
            | Self::Cousin => 0,
            Self::Son | Self::Daughter | Self::Child | Self::Nephew | Self::Niece => 1,
            Self::Grandson | Self::Granddaughter | Self::Grandchild => 2,
            Self::Other(_) => return None,
        };
        Some(offset)
    }

    /// Gender implied by the role itself, if any.
    pub fn implied_gender(&self) -> Option<Gender> {
        match self {
            Self::Father
            | Self::Stepfather
            | Self::Grandfather
            | Self::GreatGrandfather
            | Self::Son
            | Self::Grandson
            | Self::Brother
            | Self::Uncle
            | Self::Nephew => Some(Gender::Male),
            Self::Mother
            | Self::Stepmother
            | Self::Grandmother
            | Self::GreatGrandmother
            | Self::Daughter
            | Self::Granddaughter
            | Self::Sister
            | Self::Aunt
            | Self::Niece => Some(Gender::Female),
            _ => None,
        }
    }

    /// Whether this is a free-form label with no fixed meaning.
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl Default for RelationRole {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl Display for RelationRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for RelationRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RelationRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .map(|label| Self::from_label(&label))
            .unwrap_or_default())
    }
}

//! One delivery of a family's records.

use crate::model::person::{Origin, Person};
use serde::{Deserialize, Serialize};

/// Ancestors plus living members, as delivered by one store read.
///
/// The layout engine consumes whole snapshots; the latest one always wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySnapshot {
    #[serde(default)]
    pub ancestors: Vec<Person>,
    #[serde(default)]
    pub members: Vec<Person>,
}

impl FamilySnapshot {
    pub fn new(ancestors: Vec<Person>, members: Vec<Person>) -> Self {
        Self { ancestors, members }
    }

    /// Total person count across both collections.
    pub fn len(&self) -> usize {
        self.ancestors.len() + self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty() && self.members.is_empty()
    }

    /// Iterates ancestors first, then members, tagged with their origin.
    pub fn iter(&self) -> impl Iterator<Item = (Origin, &Person)> {
        self.ancestors
            .iter()
            .map(|person| (Origin::Ancestor, person))
            .chain(self.members.iter().map(|person| (Origin::Member, person)))
    }

    /// Appends a person to the collection matching `origin`.
    pub fn push(&mut self, origin: Origin, person: Person) {
        match origin {
            Origin::Ancestor => self.ancestors.push(person),
            Origin::Member => self.members.push(person),
        }
    }
}

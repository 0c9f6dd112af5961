//! Family use-case service.
//!
//! # Responsibility
//! - Provide add/edit/link/remove operations over person records.
//! - Build family layouts from stored snapshots.
//!
//! # Invariants
//! - Group ids are non-blank after trim.
//! - Spouse links written here are always mutual.
//! - Removing a person leaves other records' references untouched.

use crate::layout::{layout_family, FamilyGraph, LayoutConfig};
use crate::model::person::{Origin, Person, PersonId};
use crate::model::role::Gender;
use crate::repo::person_repo::{PersonListQuery, PersonRecord, PersonRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from family service operations.
#[derive(Debug)]
pub enum FamilyServiceError {
    /// Group id is blank after trim.
    InvalidGroupId,
    /// Referenced person does not exist in the group.
    PersonNotFound(PersonId),
    /// A person cannot be linked to itself.
    SelfLink(PersonId),
    /// Child already has both parent slots filled by other persons.
    ParentSlotsFull { child_id: PersonId },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for FamilyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGroupId => write!(f, "group id must not be blank"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::SelfLink(id) => write!(f, "person cannot be linked to itself: {id}"),
            Self::ParentSlotsFull { child_id } => {
                write!(f, "person already has a father and a mother: {child_id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FamilyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FamilyServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::PersonNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type FamilyServiceResult<T> = Result<T, FamilyServiceError>;

/// Family service facade.
pub struct FamilyService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> FamilyService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a historical ancestor record.
    pub fn add_ancestor(&self, group_id: &str, person: &Person) -> FamilyServiceResult<PersonId> {
        self.upsert(group_id, Origin::Ancestor, person)
    }

    /// Stores a living family member record.
    pub fn add_member(&self, group_id: &str, person: &Person) -> FamilyServiceResult<PersonId> {
        self.upsert(group_id, Origin::Member, person)
    }

    /// Replaces an existing record, keeping its origin.
    pub fn update_person(&self, group_id: &str, person: &Person) -> FamilyServiceResult<()> {
        let existing = self.require(group_id, &person.id)?;
        self.repo
            .upsert_person(group_id.trim(), existing.origin, person)?;
        Ok(())
    }

    pub fn get_person(
        &self,
        group_id: &str,
        id: &str,
    ) -> FamilyServiceResult<Option<PersonRecord>> {
        let group_id = normalize_group_id(group_id)?;
        Ok(self.repo.get_person(group_id, id)?)
    }

    pub fn list_persons(
        &self,
        group_id: &str,
        origin: Option<Origin>,
    ) -> FamilyServiceResult<Vec<PersonRecord>> {
        let group_id = normalize_group_id(group_id)?;
        let query = PersonListQuery {
            origin,
            ..PersonListQuery::group(group_id)
        };
        Ok(self.repo.list_persons(&query)?)
    }

    /// Links two persons as spouses on both sides.
    ///
    /// Former partners that still point at `a` or `b` are unlinked so that
    /// no one-sided spouse references remain from this edit. All changed
    /// records are written in one transaction.
    pub fn link_spouses(&self, group_id: &str, a: &str, b: &str) -> FamilyServiceResult<()> {
        if a == b {
            return Err(FamilyServiceError::SelfLink(a.to_string()));
        }
        let group_id = normalize_group_id(group_id)?;
        let mut first = self.require(group_id, a)?;
        let mut second = self.require(group_id, b)?;

        let mut changed = Vec::new();
        for (record, new_partner) in [(&first, b), (&second, a)] {
            if let Some(former) = record.person.spouse_id.as_deref() {
                if former != new_partner {
                    changed.extend(self.cleared_partner(group_id, former, &record.person.id)?);
                }
            }
        }

        first.person.spouse_id = Some(b.to_string());
        second.person.spouse_id = Some(a.to_string());
        changed.push(first);
        changed.push(second);
        self.write_all(group_id, &changed)?;

        info!("event=family_link module=service status=ok kind=spouse group_id={group_id}");
        Ok(())
    }

    /// Clears the spouse link of `id` and the partner's back reference.
    pub fn unlink_spouse(&self, group_id: &str, id: &str) -> FamilyServiceResult<()> {
        let group_id = normalize_group_id(group_id)?;
        let mut record = self.require(group_id, id)?;
        let Some(partner) = record.person.spouse_id.take() else {
            return Ok(());
        };

        let mut changed: Vec<PersonRecord> =
            self.cleared_partner(group_id, &partner, id)?.into_iter().collect();
        changed.push(record);
        self.write_all(group_id, &changed)
    }

    /// Records `parent_id` as a parent of `child_id`.
    ///
    /// The slot follows the parent's effective gender and replaces whoever
    /// held it; if the parent sat in the other slot, that slot is cleared.
    /// With unknown gender the first empty slot is used, father first.
    pub fn link_parent(
        &self,
        group_id: &str,
        child_id: &str,
        parent_id: &str,
    ) -> FamilyServiceResult<()> {
        if child_id == parent_id {
            return Err(FamilyServiceError::SelfLink(child_id.to_string()));
        }
        let group_id = normalize_group_id(group_id)?;
        let mut child = self.require(group_id, child_id)?;
        let parent = self.require(group_id, parent_id)?;

        let person = &mut child.person;
        match parent.person.effective_gender() {
            Gender::Male => {
                if person.mother_id.as_deref() == Some(parent_id) {
                    person.mother_id = None;
                }
                person.father_id = Some(parent_id.to_string());
            }
            Gender::Female => {
                if person.father_id.as_deref() == Some(parent_id) {
                    person.father_id = None;
                }
                person.mother_id = Some(parent_id.to_string());
            }
            Gender::Unknown => {
                let already_linked = person.father_id.as_deref() == Some(parent_id)
                    || person.mother_id.as_deref() == Some(parent_id);
                if !already_linked {
                    if person.father_id.is_none() {
                        person.father_id = Some(parent_id.to_string());
                    } else if person.mother_id.is_none() {
                        person.mother_id = Some(parent_id.to_string());
                    } else {
                        return Err(FamilyServiceError::ParentSlotsFull {
                            child_id: child_id.to_string(),
                        });
                    }
                }
            }
        }

        self.repo
            .upsert_person(group_id, child.origin, &child.person)?;
        info!("event=family_link module=service status=ok kind=parent group_id={group_id}");
        Ok(())
    }

    /// Deletes one person. Dangling references elsewhere are kept.
    pub fn remove_person(&self, group_id: &str, id: &str) -> FamilyServiceResult<()> {
        let group_id = normalize_group_id(group_id)?;
        self.repo.delete_person(group_id, id)?;
        Ok(())
    }

    /// Loads the group's snapshot and lays it out.
    pub fn build_layout(
        &self,
        group_id: &str,
        config: &LayoutConfig,
    ) -> FamilyServiceResult<FamilyGraph> {
        let group_id = normalize_group_id(group_id)?;
        let started_at = Instant::now();
        let snapshot = self.repo.load_snapshot(group_id)?;
        let graph = layout_family(&snapshot, config);

        info!(
            "event=family_layout module=service status=ok group_id={} nodes={} edges={} unresolved={} duration_ms={}",
            group_id,
            graph.nodes.len(),
            graph.edges.len(),
            graph.diagnostics.unresolved.len(),
            started_at.elapsed().as_millis()
        );
        Ok(graph)
    }

    fn upsert(
        &self,
        group_id: &str,
        origin: Origin,
        person: &Person,
    ) -> FamilyServiceResult<PersonId> {
        let group_id = normalize_group_id(group_id)?;
        self.repo.upsert_person(group_id, origin, person)?;
        Ok(person.id.clone())
    }

    fn require(&self, group_id: &str, id: &str) -> FamilyServiceResult<PersonRecord> {
        let group_id = normalize_group_id(group_id)?;
        self.repo
            .get_person(group_id, id)?
            .ok_or_else(|| FamilyServiceError::PersonNotFound(id.to_string()))
    }

    /// Partner record with its back reference to `expected` removed, if it
    /// exists and still points there.
    fn cleared_partner(
        &self,
        group_id: &str,
        partner_id: &str,
        expected: &str,
    ) -> FamilyServiceResult<Option<PersonRecord>> {
        let Some(mut partner) = self.repo.get_person(group_id, partner_id)? else {
            return Ok(None);
        };
        if partner.person.spouse_id.as_deref() != Some(expected) {
            return Ok(None);
        }
        partner.person.spouse_id = None;
        Ok(Some(partner))
    }

    fn write_all(&self, group_id: &str, records: &[PersonRecord]) -> FamilyServiceResult<()> {
        let batch: Vec<(Origin, &Person)> = records
            .iter()
            .map(|record| (record.origin, &record.person))
            .collect();
        self.repo.upsert_persons(group_id, &batch)?;
        Ok(())
    }
}

fn normalize_group_id(group_id: &str) -> FamilyServiceResult<&str> {
    let trimmed = group_id.trim();
    if trimmed.is_empty() {
        return Err(FamilyServiceError::InvalidGroupId);
    }
    Ok(trimmed)
}

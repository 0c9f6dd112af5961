//! Indexed working set with id lookup.
//!
//! # Invariants
//! - Entry order is ancestors first, then members, each in input order.
//! - The first entry carrying an id owns that id in the lookup table.

use crate::model::person::{Origin, Person};
use crate::model::snapshot::FamilySnapshot;
use std::collections::HashMap;

/// One person in the working set.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub person: &'a Person,
    pub origin: Origin,
}

/// Arena of borrowed persons plus an id lookup table.
#[derive(Debug)]
pub struct WorkingSet<'a> {
    entries: Vec<Entry<'a>>,
    lookup: HashMap<&'a str, usize>,
    duplicates: Vec<(&'a str, Vec<usize>)>,
}

impl<'a> WorkingSet<'a> {
    pub fn from_snapshot(snapshot: &'a FamilySnapshot) -> Self {
        let mut entries = Vec::with_capacity(snapshot.len());
        let mut lookup: HashMap<&'a str, usize> = HashMap::with_capacity(snapshot.len());
        let mut repeated: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut duplicate_order: Vec<&'a str> = Vec::new();

        for (origin, person) in snapshot.iter() {
            let index = entries.len();
            entries.push(Entry { person, origin });

            let id = person.id.as_str();
            match lookup.get(id).copied() {
                Some(first) => {
                    let indexes = repeated.entry(id).or_insert_with(|| {
                        duplicate_order.push(id);
                        vec![first]
                    });
                    indexes.push(index);
                }
                None => {
                    lookup.insert(id, index);
                }
            }
        }

        let duplicates = duplicate_order
            .into_iter()
            .filter_map(|id| repeated.remove(id).map(|indexes| (id, indexes)))
            .collect();

        Self {
            entries,
            lookup,
            duplicates,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry<'a>> {
        self.entries.get(index)
    }

    pub fn person(&self, index: usize) -> &'a Person {
        self.entries[index].person
    }

    /// Resolves an id to the index of its first occurrence.
    pub fn resolve(&self, id: &str) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    /// Resolves the spouse of `index`, excluding self references.
    pub fn spouse_of(&self, index: usize) -> Option<usize> {
        self.person(index)
            .spouse_id
            .as_deref()
            .and_then(|id| self.resolve(id))
            .filter(|&spouse| spouse != index)
    }

    /// Whether `a` and `b` name each other as spouse.
    pub fn are_mutual_spouses(&self, a: usize, b: usize) -> bool {
        a != b && self.spouse_of(a) == Some(b) && self.spouse_of(b) == Some(a)
    }

    /// Ids that appear more than once, in order of first repetition.
    pub fn duplicates(&self) -> &[(&'a str, Vec<usize>)] {
        &self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::WorkingSet;
    use crate::model::person::{Origin, Person};
    use crate::model::role::RelationRole;
    use crate::model::snapshot::FamilySnapshot;

    fn person(id: &str) -> Person {
        Person::with_id(id, id.to_uppercase(), RelationRole::Sibling)
    }

    #[test]
    fn merges_ancestors_before_members() {
        let snapshot = FamilySnapshot::new(vec![person("a")], vec![person("m"), person("n")]);
        let set = WorkingSet::from_snapshot(&snapshot);

        assert_eq!(set.len(), 3);
        assert_eq!(set.entries()[0].origin, Origin::Ancestor);
        assert_eq!(set.entries()[1].origin, Origin::Member);
        assert_eq!(set.resolve("n"), Some(2));
        assert_eq!(set.resolve("zzz"), None);
    }

    #[test]
    fn first_occurrence_owns_duplicate_id() {
        let snapshot = FamilySnapshot::new(vec![person("x")], vec![person("y"), person("x")]);
        let set = WorkingSet::from_snapshot(&snapshot);

        assert_eq!(set.resolve("x"), Some(0));
        assert_eq!(set.duplicates().len(), 1);
        assert_eq!(set.duplicates()[0].0, "x");
        assert_eq!(set.duplicates()[0].1, vec![0, 2]);
    }

    #[test]
    fn spouse_of_ignores_self_reference() {
        let mut lonely = person("a");
        lonely.spouse_id = Some("a".to_string());
        let snapshot = FamilySnapshot::new(vec![lonely], Vec::new());
        let set = WorkingSet::from_snapshot(&snapshot);

        assert_eq!(set.spouse_of(0), None);
    }
}

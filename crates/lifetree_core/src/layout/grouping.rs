//! Tier rows and couple grouping.
//!
//! # Invariants
//! - Each working-set index lands in exactly one slot of exactly one row.
//! - A couple is two mutual spouses in the same tier; everyone else is single.
//! - Rows are sorted by ascending tier; slots keep working-set order, keyed
//!   by the lower index of a couple.

use crate::layout::arena::WorkingSet;
use crate::layout::tier::TierAssignment;
use std::collections::BTreeMap;

/// One horizontal position within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Single(usize),
    /// Lower working-set index first.
    Couple(usize, usize),
}

impl Slot {
    pub fn members(&self) -> impl Iterator<Item = usize> {
        let (first, second) = match *self {
            Self::Single(index) => (index, None),
            Self::Couple(left, right) => (left, Some(right)),
        };
        std::iter::once(first).chain(second)
    }
}

/// All slots of one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub tier: i32,
    pub slots: Vec<Slot>,
}

impl Row {
    pub fn person_count(&self) -> usize {
        self.slots.iter().map(|slot| slot.members().count()).sum()
    }

    pub fn couple_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Couple(..)))
            .count()
    }
}

/// Groups entries into tier rows with couples paired.
pub fn group_rows(set: &WorkingSet<'_>, tiers: &[TierAssignment]) -> Vec<Row> {
    let mut by_tier: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (index, assignment) in tiers.iter().enumerate() {
        by_tier.entry(assignment.tier).or_default().push(index);
    }

    let mut placed = vec![false; set.len()];
    by_tier
        .into_iter()
        .map(|(tier, indexes)| {
            let mut slots = Vec::with_capacity(indexes.len());
            for index in indexes {
                if placed[index] {
                    continue;
                }
                placed[index] = true;

                let partner = set
                    .spouse_of(index)
                    .filter(|&spouse| !placed[spouse])
                    .filter(|&spouse| tiers[spouse].tier == tier)
                    .filter(|&spouse| set.are_mutual_spouses(index, spouse));
                match partner {
                    Some(spouse) => {
                        placed[spouse] = true;
                        slots.push(Slot::Couple(index, spouse));
                    }
                    None => slots.push(Slot::Single(index)),
                }
            }
            Row { tier, slots }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{group_rows, Slot};
    use crate::layout::arena::WorkingSet;
    use crate::layout::graph::TierSource;
    use crate::layout::tier::TierAssignment;
    use crate::model::person::Person;
    use crate::model::role::RelationRole;
    use crate::model::snapshot::FamilySnapshot;

    fn at(tier: i32) -> TierAssignment {
        TierAssignment {
            tier,
            source: TierSource::Role,
        }
    }

    fn married(id: &str, spouse: &str) -> Person {
        let mut person = Person::with_id(id, id, RelationRole::Sibling);
        person.spouse_id = Some(spouse.to_string());
        person
    }

    #[test]
    fn mutual_spouses_in_same_tier_form_couple() {
        let snapshot = FamilySnapshot::new(
            vec![married("a", "b"), Person::with_id("c", "c", RelationRole::Sibling)],
            vec![married("b", "a")],
        );
        let set = WorkingSet::from_snapshot(&snapshot);
        let rows = group_rows(&set, &[at(0), at(0), at(0)]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slots, vec![Slot::Couple(0, 2), Slot::Single(1)]);
        assert_eq!(rows[0].person_count(), 3);
        assert_eq!(rows[0].couple_count(), 1);
    }

    #[test]
    fn spouses_in_different_tiers_stay_single() {
        let snapshot = FamilySnapshot::new(vec![married("a", "b"), married("b", "a")], Vec::new());
        let set = WorkingSet::from_snapshot(&snapshot);
        let rows = group_rows(&set, &[at(-1), at(0)]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tier, -1);
        assert_eq!(rows[0].slots, vec![Slot::Single(0)]);
        assert_eq!(rows[1].slots, vec![Slot::Single(1)]);
    }

    #[test]
    fn one_sided_spouse_link_is_not_a_couple() {
        let snapshot = FamilySnapshot::new(
            vec![married("a", "b"), Person::with_id("b", "b", RelationRole::Sibling)],
            Vec::new(),
        );
        let set = WorkingSet::from_snapshot(&snapshot);
        let rows = group_rows(&set, &[at(0), at(0)]);

        assert_eq!(rows[0].slots, vec![Slot::Single(0), Slot::Single(1)]);
    }
}

//! Generation tier assignment.
//!
//! # Responsibility
//! - Derive one tier per working-set entry from role offsets and birth years.
//! - Record where each tier came from and where the two derivations disagree.
//!
//! # Invariants
//! - Every entry receives exactly one tier.
//! - Lower tiers are older generations; tier 0 holds the reference person.
//! - Birth-year tiers are clamped to the configured tier bounds.

use crate::layout::arena::WorkingSet;
use crate::layout::config::{LayoutConfig, TierStrategy};
use crate::layout::graph::{TierConflict, TierSource};

/// Tier chosen for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierAssignment {
    pub tier: i32,
    pub source: TierSource,
}

impl TierAssignment {
    const DEFAULT: Self = Self {
        tier: 0,
        source: TierSource::Default,
    };
}

/// Buckets a birth year into a tier: `floor((year - anchor) / span)`.
///
/// Computed in `i64` so any host-supplied anchor stays panic-free.
pub fn birth_year_tier(year: i32, config: &LayoutConfig) -> i32 {
    let span = i64::from(config.generation_span_years.max(1));
    let (min_tier, max_tier) = config.tier_bounds();
    let tier = (i64::from(year) - i64::from(config.anchor_year))
        .div_euclid(span)
        .clamp(i64::from(min_tier), i64::from(max_tier));
    i32::try_from(tier).unwrap_or(if tier < 0 { min_tier } else { max_tier })
}

/// Assigns tiers to every entry, in working-set order.
///
/// Entries left at the default tier inherit the tier of a resolvable spouse
/// that was placed by role or birth year.
pub fn assign_tiers(
    set: &WorkingSet<'_>,
    config: &LayoutConfig,
) -> (Vec<TierAssignment>, Vec<TierConflict>) {
    let mut conflicts = Vec::new();
    let mut assignments: Vec<TierAssignment> = set
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let role_tier = entry.person.role.generation_offset();
            let year_tier = entry
                .person
                .birth_year()
                .map(|year| birth_year_tier(year, config));
            let assignment = choose(config.strategy, role_tier, year_tier);

            if let (Some(role_tier), Some(birth_year_tier)) = (role_tier, year_tier) {
                if role_tier != birth_year_tier {
                    conflicts.push(TierConflict {
                        person_id: entry.person.id.clone(),
                        person_index: index,
                        role_tier,
                        birth_year_tier,
                        chosen: assignment.source,
                    });
                }
            }
            assignment
        })
        .collect();

    let inherited: Vec<(usize, i32)> = assignments
        .iter()
        .enumerate()
        .filter(|(_, assignment)| assignment.source == TierSource::Default)
        .filter_map(|(index, _)| {
            let spouse = set.spouse_of(index)?;
            let placed = assignments[spouse];
            matches!(placed.source, TierSource::Role | TierSource::BirthYear)
                .then_some((index, placed.tier))
        })
        .collect();
    for (index, tier) in inherited {
        assignments[index] = TierAssignment {
            tier,
            source: TierSource::Spouse,
        };
    }

    (assignments, conflicts)
}

fn choose(
    strategy: TierStrategy,
    role_tier: Option<i32>,
    year_tier: Option<i32>,
) -> TierAssignment {
    let by_role = role_tier.map(|tier| TierAssignment {
        tier,
        source: TierSource::Role,
    });
    let by_year = year_tier.map(|tier| TierAssignment {
        tier,
        source: TierSource::BirthYear,
    });

    let chosen = match strategy {
        TierStrategy::RolePreferred => by_role.or(by_year),
        TierStrategy::BirthYearPreferred => by_year.or(by_role),
        TierStrategy::RoleOnly => by_role,
        TierStrategy::BirthYearOnly => by_year,
    };
    chosen.unwrap_or(TierAssignment::DEFAULT)
}

//! Family layout pipeline: merge, tier, group, position, connect.
//!
//! # Invariants
//! - Pure: no I/O, no shared state; equal inputs give equal graphs.
//! - One node per input person, including duplicate ids.
//! - Edges only between resolvable, distinct persons; everything else is a
//!   diagnostic.
//! - Edge ids are built from working-set indexes, never from person ids, so
//!   they stay unique whatever characters the ids contain.

use crate::layout::arena::WorkingSet;
use crate::layout::config::{LayoutConfig, Orientation};
use crate::layout::graph::{
    AsymmetricSpouseLink, CoupleMarker, DuplicateId, EdgeKind, EdgeStyle, FamilyGraph, GraphEdge,
    GraphNode, LayoutDiagnostics, NodeIcon, ParentSide, TierRow, UnresolvedReason,
    UnresolvedReference, FATHER_EDGE_COLOR, MOTHER_EDGE_COLOR, SPOUSE_EDGE_COLOR,
};
use crate::layout::grouping::{group_rows, Row, Slot};
use crate::layout::tier::{assign_tiers, TierAssignment};
use crate::model::person::ReferenceField;
use crate::model::snapshot::FamilySnapshot;
use log::{debug, warn};
use std::collections::HashSet;

/// Lays out a family snapshot.
///
/// Never fails: unresolved references, tier disagreements and duplicate ids
/// end up in [`FamilyGraph::diagnostics`].
pub fn layout_family(snapshot: &FamilySnapshot, config: &LayoutConfig) -> FamilyGraph {
    let set = WorkingSet::from_snapshot(snapshot);
    let (tiers, tier_conflicts) = assign_tiers(&set, config);
    let rows = group_rows(&set, &tiers);

    let mut graph = FamilyGraph::default();
    place_nodes(&set, &tiers, &rows, config, &mut graph);
    connect(&set, &mut graph.edges, &mut graph.diagnostics);

    graph.diagnostics.tier_conflicts = tier_conflicts;
    graph.diagnostics.duplicate_ids = set
        .duplicates()
        .iter()
        .map(|(id, indexes)| DuplicateId {
            id: (*id).to_string(),
            indexes: indexes.clone(),
        })
        .collect();

    for duplicate in &graph.diagnostics.duplicate_ids {
        warn!(
            "event=family_layout module=layout status=duplicate_id id={} occurrences={}",
            duplicate.id,
            duplicate.indexes.len()
        );
    }
    debug!(
        "event=family_layout module=layout status=ok persons={} tiers={} nodes={} edges={} unresolved={} conflicts={}",
        set.len(),
        graph.tiers.len(),
        graph.nodes.len(),
        graph.edges.len(),
        graph.diagnostics.unresolved.len(),
        graph.diagnostics.tier_conflicts.len()
    );

    graph
}

fn place_nodes(
    set: &WorkingSet<'_>,
    tiers: &[TierAssignment],
    rows: &[Row],
    config: &LayoutConfig,
    graph: &mut FamilyGraph,
) {
    let node_width = config.node_width.max(0.0);
    let node_height = config.node_height.max(0.0);
    let horizontal_gap = config.horizontal_gap.max(0.0);
    let couple_gap = config.couple_gap.max(0.0);

    let mut positions = vec![(0.0_f64, 0.0_f64); set.len()];
    let row_count = rows.len();

    for (row_index, row) in rows.iter().enumerate() {
        let stack_index = match config.orientation {
            Orientation::OldestOnTop => row_index,
            Orientation::OldestAtBottom => row_count - 1 - row_index,
        };
        let y = stack_index as f64 * config.row_pitch();

        let slot_width = |slot: &Slot| match slot {
            Slot::Single(_) => node_width,
            Slot::Couple(..) => node_width * 2.0 + couple_gap,
        };
        let row_width: f64 = row.slots.iter().map(slot_width).sum::<f64>()
            + horizontal_gap * row.slots.len().saturating_sub(1) as f64;

        let mut x = -row_width / 2.0;
        for slot in &row.slots {
            match *slot {
                Slot::Single(index) => positions[index] = (x, y),
                Slot::Couple(left, right) => {
                    let right_x = x + node_width + couple_gap;
                    positions[left] = (x, y);
                    positions[right] = (right_x, y);
                    graph.couples.push(CoupleMarker {
                        left: set.person(left).id.clone(),
                        right: set.person(right).id.clone(),
                        x: x + node_width + couple_gap / 2.0,
                        y: y + node_height / 2.0,
                    });
                }
            }
            x += slot_width(slot) + horizontal_gap;
        }

        graph.tiers.push(TierRow {
            tier: row.tier,
            y,
            person_count: row.person_count(),
            couple_count: row.couple_count(),
        });
    }

    graph.nodes = set
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let person = entry.person;
            let (x, y) = positions[index];
            GraphNode {
                id: person.id.clone(),
                index,
                label: person.name.clone(),
                role: person.role.label().to_string(),
                origin: entry.origin,
                icon: NodeIcon::from(person.effective_gender()),
                tier: tiers[index].tier,
                tier_source: tiers[index].source,
                x,
                y,
                living: person.is_living(),
                life_span: person.life_span_label(),
            }
        })
        .collect();
}

/// Structural identity of an edge. Spouse pairs are stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    Parent(ParentSide, usize, usize),
    Spouse(usize, usize),
}

fn connect(set: &WorkingSet<'_>, edges: &mut Vec<GraphEdge>, diagnostics: &mut LayoutDiagnostics) {
    let mut emitted: HashSet<EdgeKey> = HashSet::new();

    for (index, entry) in set.entries().iter().enumerate() {
        let person = entry.person;
        for (field, target_id) in person.references() {
            let resolved = set.resolve(target_id);
            let target = match resolved {
                Some(target) if target != index && target_id != person.id => target,
                other => {
                    let reason = if other.is_none() {
                        UnresolvedReason::Missing
                    } else {
                        UnresolvedReason::SelfReference
                    };
                    diagnostics.unresolved.push(UnresolvedReference {
                        person_id: person.id.clone(),
                        person_index: index,
                        field,
                        target_id: target_id.to_string(),
                        reason,
                    });
                    continue;
                }
            };
            let target_person = set.person(target);

            let (key, edge) = match field {
                ReferenceField::Father | ReferenceField::Mother => {
                    let (side, prefix, color) = if field == ReferenceField::Father {
                        (ParentSide::Father, "father", FATHER_EDGE_COLOR)
                    } else {
                        (ParentSide::Mother, "mother", MOTHER_EDGE_COLOR)
                    };
                    let edge = GraphEdge {
                        id: format!("{prefix}-{target}-{index}"),
                        source: target_person.id.clone(),
                        target: person.id.clone(),
                        source_index: target,
                        target_index: index,
                        kind: EdgeKind::Parent { side },
                        style: EdgeStyle::Solid,
                        color,
                    };
                    (EdgeKey::Parent(side, target, index), edge)
                }
                ReferenceField::Spouse => {
                    if !set.are_mutual_spouses(index, target) {
                        diagnostics
                            .asymmetric_spouse_links
                            .push(AsymmetricSpouseLink {
                                person_id: person.id.clone(),
                                spouse_id: target_person.id.clone(),
                            });
                        continue;
                    }
                    let edge = GraphEdge {
                        id: format!("spouse-{index}-{target}"),
                        source: person.id.clone(),
                        target: target_person.id.clone(),
                        source_index: index,
                        target_index: target,
                        kind: EdgeKind::Spouse,
                        style: EdgeStyle::Dashed,
                        color: SPOUSE_EDGE_COLOR,
                    };
                    (EdgeKey::Spouse(index.min(target), index.max(target)), edge)
                }
            };

            if emitted.insert(key) {
                edges.push(edge);
            }
        }
    }
}

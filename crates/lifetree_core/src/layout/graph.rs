//! Renderer-facing graph produced by the family layout.
//!
//! # Invariants
//! - `nodes` has exactly one entry per input person, in working-set order.
//! - Every edge's `source`/`target` index points into `nodes`.
//! - Edge ids are unique within one graph.

use crate::model::person::{Origin, PersonId, ReferenceField};
use crate::model::role::Gender;
use serde::Serialize;

/// Where a node's tier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSource {
    /// Generation offset of a known relation role.
    Role,
    /// Birth-year bucket.
    BirthYear,
    /// Copied from a placed spouse.
    Spouse,
    /// Nothing usable; the person sits in tier 0.
    Default,
}

/// Icon hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeIcon {
    Male,
    Female,
    Neutral,
}

impl From<Gender> for NodeIcon {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Male => Self::Male,
            Gender::Female => Self::Female,
            Gender::Unknown => Self::Neutral,
        }
    }
}

/// One positioned person.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: PersonId,
    /// Position in the working set (ancestors first, then members).
    pub index: usize,
    pub label: String,
    pub role: String,
    pub origin: Origin,
    pub icon: NodeIcon,
    pub tier: i32,
    pub tier_source: TierSource,
    /// Top-left corner.
    pub x: f64,
    pub y: f64,
    pub living: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_span: Option<String>,
}

/// Parent side of a parent edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentSide {
    Father,
    Mother,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeKind {
    /// Parent to child.
    Parent { side: ParentSide },
    /// Between two mutually linked spouses.
    Spouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    Solid,
    Dashed,
}

pub const FATHER_EDGE_COLOR: &str = "#3b82f6";
pub const MOTHER_EDGE_COLOR: &str = "#ec4899";
pub const SPOUSE_EDGE_COLOR: &str = "#f59e0b";

/// One relationship line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: PersonId,
    pub target: PersonId,
    pub source_index: usize,
    pub target_index: usize,
    pub kind: EdgeKind,
    pub style: EdgeStyle,
    pub color: &'static str,
}

/// Connecting marker drawn between the two nodes of a couple.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleMarker {
    pub left: PersonId,
    pub right: PersonId,
    /// Marker center.
    pub x: f64,
    pub y: f64,
}

/// One laid-out generation row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRow {
    pub tier: i32,
    pub y: f64,
    pub person_count: usize,
    pub couple_count: usize,
}

/// Why a soft reference produced no edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No person with the target id exists in the working set.
    Missing,
    /// The reference points at the person itself.
    SelfReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    pub person_id: PersonId,
    pub person_index: usize,
    pub field: ReferenceField,
    pub target_id: PersonId,
    pub reason: UnresolvedReason,
}

/// Role and birth year both produced a tier, and they differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierConflict {
    pub person_id: PersonId,
    pub person_index: usize,
    pub role_tier: i32,
    pub birth_year_tier: i32,
    pub chosen: TierSource,
}

/// A spouse link that is not returned by the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsymmetricSpouseLink {
    pub person_id: PersonId,
    pub spouse_id: PersonId,
}

/// Ids shared by more than one input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateId {
    pub id: PersonId,
    /// Working-set indexes, first occurrence first.
    pub indexes: Vec<usize>,
}

/// Data problems the layout tolerated instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDiagnostics {
    pub unresolved: Vec<UnresolvedReference>,
    pub tier_conflicts: Vec<TierConflict>,
    pub asymmetric_spouse_links: Vec<AsymmetricSpouseLink>,
    pub duplicate_ids: Vec<DuplicateId>,
}

impl LayoutDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
            && self.tier_conflicts.is_empty()
            && self.asymmetric_spouse_links.is_empty()
            && self.duplicate_ids.is_empty()
    }
}

/// Complete layout result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub couples: Vec<CoupleMarker>,
    pub tiers: Vec<TierRow>,
    pub diagnostics: LayoutDiagnostics,
}

impl FamilyGraph {
    /// First node with the given id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn parent_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges
            .iter()
            .filter(|edge| matches!(edge.kind, EdgeKind::Parent { .. }))
    }

    pub fn spouse_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Spouse)
    }
}

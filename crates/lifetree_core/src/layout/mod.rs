//! Genealogy layout engine.
//!
//! # Responsibility
//! - Turn a flat snapshot of ancestors and members into a positioned
//!   node/edge graph for a generic graph renderer.
//! - Surface data problems (dangling ids, tier disagreements, duplicate ids)
//!   as diagnostics instead of errors.
//!
//! # Invariants
//! - Layout is recomputed from scratch on every snapshot and never persisted.
//! - Every input person yields exactly one node.
//! - A mutually linked spouse pair yields exactly one spouse edge.

pub mod arena;
pub mod config;
pub mod engine;
pub mod graph;
pub mod grouping;
pub mod tier;

pub use config::{LayoutConfig, Orientation, TierStrategy};
pub use engine::layout_family;
pub use graph::{
    AsymmetricSpouseLink, CoupleMarker, DuplicateId, EdgeKind, EdgeStyle, FamilyGraph, GraphEdge,
    GraphNode, LayoutDiagnostics, NodeIcon, ParentSide, TierConflict, TierRow, TierSource,
    UnresolvedReason, UnresolvedReference,
};

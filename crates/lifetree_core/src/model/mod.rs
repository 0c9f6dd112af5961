//! Family domain model.
//!
//! # Responsibility
//! - Define the canonical person record shared by ancestor and member views.
//! - Replace free-text relation labels with an explicit role enumeration.
//!
//! # Invariants
//! - Every person is identified by a non-blank string id.
//! - Relationships are soft references: ids are never required to resolve.

pub mod person;
pub mod role;
pub mod snapshot;

//! Core domain logic for the LifeTree family view.
//! This crate owns the person model, the genealogy layout engine and the
//! local person store.

pub mod db;
pub mod layout;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use layout::{
    layout_family, EdgeKind, EdgeStyle, FamilyGraph, GraphEdge, GraphNode, LayoutConfig,
    LayoutDiagnostics, NodeIcon, Orientation, ParentSide, TierSource, TierStrategy,
    UnresolvedReason,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::person::{
    extract_year, LifeStatus, Origin, Person, PersonId, PersonValidationError, ReferenceField,
};
pub use model::role::{Gender, RelationRole};
pub use model::snapshot::FamilySnapshot;
pub use repo::person_repo::{
    PersonListQuery, PersonRecord, PersonRepository, RepoError, RepoResult,
    SqlitePersonRepository,
};
pub use service::family_service::{FamilyService, FamilyServiceError, FamilyServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

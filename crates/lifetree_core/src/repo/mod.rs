//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define document-style upsert/read contracts for person records.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes run `Person::validate()` before touching storage.
//! - Reads reject invalid persisted state instead of masking it.

pub mod person_repo;

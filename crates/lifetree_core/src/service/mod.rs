//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into family-level operations.
//! - Keep FFI and CLI layers decoupled from storage details.

pub mod family_service;

//! Flutter-facing bindings for the LifeTree core.

pub mod api;

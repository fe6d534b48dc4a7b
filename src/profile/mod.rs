// src/profile/mod.rs
// =============================================================================
// API profiles: what each version of the autocomplete service accepts.
//
// A profile bundles the character alphabet queries are built from, the
// per-request result cap (used to detect truncation) and the rate cap
// (used to space requests). Profiles are immutable once built.
// =============================================================================

mod registry;

pub use registry::{ApiProfile, ProfileRegistry};

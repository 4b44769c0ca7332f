//! Derived-artifact cache
//!
//! In-memory slots for lazily computed artifacts, a fingerprint-keyed
//! store on disk, and the recycle-or-rebuild fallback chain for the
//! relaxation.
//!
//! # Artifact States
//!
//! | Artifact | Depends on | Invalidated by | On invalidation |
//! |----------|------------|----------------|-----------------|
//! | Substitutions | structure | never | n/a |
//! | Objective | physical parameters | parameter change | dropped |
//! | Relaxation | structure, level, constraints, objective | level, constraint or objective change | kept as outdated |
//!
//! # Lookup Order
//!
//! 1. Full fingerprint on disk (a solved hit is final)
//! 2. Short fingerprint on disk
//! 3. Outdated in-memory relaxation
//! 4. Full rebuild

pub mod recycle;
pub mod slot;
pub mod store;

pub use recycle::{recycle_or_rebuild, Outcome};
pub use slot::{Cached, RetainingCache};
pub use store::{format_bytes, ArtifactHeader, ArtifactStore, LoadSource, Loaded, StoredEntry};

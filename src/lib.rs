//! sdpcache - Fingerprinted, recyclable relaxation cache
//!
//! Builds moment relaxations of bosonic and fermionic lattice models,
//! keeps them in memory and on disk keyed by configuration fingerprints,
//! and adapts an existing relaxation to new particle-number constraints
//! instead of regenerating it.

pub mod algebra;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod model;
pub mod observables;
pub mod relaxation;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{SdpError, SdpResult};

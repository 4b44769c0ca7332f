//! Configuration fingerprints
//!
//! The short fingerprint names a family of relaxations that can be turned
//! into one another by swapping constraint rows: lattice shape, boundary,
//! window and level. The full fingerprint adds every coupling constant and
//! constraint value and names one solved instance.
//!
//! ```text
//! short: _lat=4x1_periodic=1_window=2_level=1
//! full:  _lat=4x1_mu=0_t=1_U=1_n=2_periodic=1_window=2_level=1
//! ```

use crate::model::constraints::Constraints;
use crate::model::lattice::Lattice;
use crate::relaxation::RelaxationLevel;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Both fingerprints of one configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprints {
    pub short: String,
    pub full: String,
}

fn lattice_prefix(lattice: &Lattice) -> String {
    format!("_lat={}x{}", lattice.length(), lattice.width())
}

fn structure_suffix(out: &mut String, lattice: &Lattice, level: RelaxationLevel) {
    if let Some(code) = lattice.boundary().code() {
        let _ = write!(out, "_periodic={}", code);
    }
    if lattice.has_window() {
        let _ = write!(out, "_window={}", lattice.window());
    }
    let _ = write!(out, "_level={}", level);
}

pub fn short_fingerprint(lattice: &Lattice, level: RelaxationLevel) -> String {
    let mut out = lattice_prefix(lattice);
    structure_suffix(&mut out, lattice, level);
    out
}

pub fn full_fingerprint(
    lattice: &Lattice,
    level: RelaxationLevel,
    parameters: &[(&str, f64)],
    constraints: &Constraints,
) -> String {
    let mut out = lattice_prefix(lattice);
    for (name, value) in parameters {
        let _ = write!(out, "_{}={}", name, value);
    }
    for (kind, value) in constraints.iter() {
        let _ = write!(out, "_{}={}", kind.key(), value);
    }
    structure_suffix(&mut out, lattice, level);
    out
}

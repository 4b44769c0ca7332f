//! Model strategy trait
//!
//! Each lattice model supplies its own Hamiltonian, rewrite rules and
//! custom monomial blocks. The generic core in [`super::LatticeModel`]
//! owns caching and persistence and never looks inside a strategy.

use super::lattice::Lattice;
use crate::algebra::{Monomial, Operator, Polynomial, Substitutions};
use crate::error::{SdpError, SdpResult};
use crate::observables::Observable;

/// Per-model construction of the derived artifacts
pub trait ModelStrategy {
    /// Model name used in logs and artifact headers
    fn name(&self) -> &'static str;

    /// Number of operator modes on `lattice`
    fn modes(&self, lattice: &Lattice) -> usize {
        lattice.sites()
    }

    /// Physical parameters with their current values, in fingerprint order
    fn parameters(&self) -> Vec<(&'static str, f64)>;

    /// Store a physical parameter. Unknown names are rejected.
    fn set_parameter(&mut self, name: &str, value: f64) -> SdpResult<()>;

    /// Commutation rules of the operator algebra
    fn create_substitutions(&self, lattice: &Lattice) -> Substitutions;

    /// Hamiltonian for the current parameters
    fn create_objective(&self, lattice: &Lattice) -> SdpResult<Polynomial>;

    /// Custom moment-matrix blocks used at the `custom` level
    fn create_monomials(&self, lattice: &Lattice) -> Vec<Vec<Monomial>>;

    /// Quantities reported by `run --write`
    fn observables(&self) -> &'static [Observable];

    /// Occupation operator of one site
    fn site_density(&self, _lattice: &Lattice, site: usize) -> Polynomial {
        Polynomial::number(site)
    }

    /// Spin polarization `(N_up - N_down) / 2`, for models carrying spin
    fn spin_polarization(&self, _lattice: &Lattice) -> SdpResult<Polynomial> {
        Err(SdpError::unsupported(format!(
            "magnetization is not defined for {}",
            self.name()
        )))
    }
}

/// Error for a parameter name the model does not know
pub(crate) fn unknown_parameter(model: &str, name: &str) -> SdpError {
    SdpError::UnknownParameter {
        model: model.to_string(),
        name: name.to_string(),
    }
}

/// Creators and annihilators over `modes`, as single-operator words
pub(crate) fn operator_words(modes: &[usize]) -> Vec<Monomial> {
    modes
        .iter()
        .map(|&i| Operator::annihilator(i).into())
        .chain(modes.iter().map(|&i| Operator::creator(i).into()))
        .collect()
}

/// Quadratic moment blocks over a window of modes: annihilator pairs,
/// mixed pairs in both orders, and creator pairs
pub(crate) fn pair_blocks(window: &[usize]) -> Vec<Vec<Monomial>> {
    let word = |a: Operator, b: Operator| Monomial::new(vec![a, b]);
    let (a, c) = (Operator::annihilator, Operator::creator);

    let mut annihilators = Vec::new();
    let mut mixed = Vec::new();
    let mut reversed = Vec::new();
    let mut creators = Vec::new();
    for &i in window {
        for &j in window {
            annihilators.push(word(a(j), a(i)));
            mixed.push(word(c(j), a(i)));
            reversed.push(word(a(j), c(i)));
            creators.push(word(c(j), c(i)));
        }
    }
    mixed.extend(reversed);
    vec![annihilators, mixed, creators]
}

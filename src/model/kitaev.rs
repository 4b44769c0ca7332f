//! Kitaev chain with long-range pairing

use super::fermi_hubbard::{hopping_pair, require_chain};
use super::lattice::Lattice;
use super::strategy::{operator_words, pair_blocks, unknown_parameter, ModelStrategy};
use crate::algebra::{fermionic_substitutions, Monomial, Operator, Polynomial, Substitutions};
use crate::error::SdpResult;
use crate::observables::Observable;

/// Spinless fermions with
/// `H = -mu (n_r - 1/2) - t (c_r' c_s + h.c.) + Delta d^-alpha (c_r c_s + c_s' c_r')`
///
/// Every pair of sites is coupled once. On a closed chain the distance is
/// the shorter way round and a bond taking the wrapped way picks up the
/// boundary phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongRangeKitaev {
    pub mu: f64,
    pub t: f64,
    pub alpha: f64,
    pub delta: f64,
}

impl LongRangeKitaev {
    /// Pairing distance and phase between `r` and `r + d`
    fn pairing_bond(lattice: &Lattice, d: usize) -> (usize, f64) {
        let length = lattice.length();
        match lattice.boundary().wrap_sign() {
            Some(sign) if length - d < d => (length - d, sign),
            _ => (d, 1.0),
        }
    }
}

impl ModelStrategy for LongRangeKitaev {
    fn name(&self) -> &'static str {
        "long-range-kitaev"
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("mu", self.mu),
            ("t", self.t),
            ("alpha", self.alpha),
            ("Delta", self.delta),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> SdpResult<()> {
        match name {
            "mu" => self.mu = value,
            "t" => self.t = value,
            "alpha" => self.alpha = value,
            "Delta" => self.delta = value,
            _ => return Err(unknown_parameter(self.name(), name)),
        }
        Ok(())
    }

    fn create_substitutions(&self, lattice: &Lattice) -> Substitutions {
        fermionic_substitutions(self.modes(lattice))
    }

    fn create_objective(&self, lattice: &Lattice) -> SdpResult<Polynomial> {
        require_chain(lattice, self.name())?;

        let length = lattice.length();
        let mut hamiltonian = Polynomial::zero();
        for r in 0..length {
            if self.mu != 0.0 {
                let shifted = Polynomial::number(r) - Polynomial::constant(0.5);
                hamiltonian = hamiltonian - shifted * self.mu;
            }

            for (s, phase) in lattice.forward_neighbors(r) {
                hamiltonian = hamiltonian - hopping_pair(r, s) * (self.t * phase);
            }

            if self.delta == 0.0 {
                continue;
            }
            for s in r + 1..length {
                let (distance, phase) = Self::pairing_bond(lattice, s - r);
                let strength = self.delta * (distance as f64).powf(-self.alpha) * phase;
                let pair = Monomial::new(vec![Operator::annihilator(r), Operator::annihilator(s)]);
                let conjugate = pair.adjoint();
                hamiltonian.add_term(pair, strength);
                hamiltonian.add_term(conjugate, strength);
            }
        }
        Ok(hamiltonian)
    }

    fn create_monomials(&self, lattice: &Lattice) -> Vec<Vec<Monomial>> {
        let mut blocks = Vec::new();
        for start in lattice.window_starts() {
            let window: Vec<usize> = (start..start + lattice.window()).collect();
            blocks.push(operator_words(&window));
            blocks.extend(pair_blocks(&window));
        }
        blocks
    }

    fn observables(&self) -> &'static [Observable] {
        &[Observable::Primal, Observable::Dual, Observable::ParticleNumber]
    }
}

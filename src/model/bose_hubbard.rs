//! Bose-Hubbard model

use super::lattice::Lattice;
use super::strategy::{pair_blocks, unknown_parameter, ModelStrategy};
use crate::algebra::{bosonic_substitutions, Monomial, Operator, Polynomial, Substitutions};
use crate::error::{SdpError, SdpResult};
use crate::observables::Observable;

/// `H = U/2 n(n-1) - mu n - t (b_r' b_s + b_s' b_r)` summed over sites and
/// nearest-neighbour bonds
#[derive(Debug, Clone, PartialEq)]
pub struct BoseHubbard {
    pub u: f64,
    pub mu: f64,
    pub t: f64,
}

impl Default for BoseHubbard {
    fn default() -> Self {
        Self {
            u: 1.0,
            mu: 0.0,
            t: 0.0,
        }
    }
}

fn hopping(r: usize, s: usize) -> Polynomial {
    Polynomial::term(
        Monomial::new(vec![Operator::creator(r), Operator::annihilator(s)]),
        1.0,
    )
}

impl ModelStrategy for BoseHubbard {
    fn name(&self) -> &'static str {
        "bose-hubbard"
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![("mu", self.mu), ("t", self.t), ("U", self.u)]
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> SdpResult<()> {
        match name {
            "mu" => self.mu = value,
            "t" => self.t = value,
            "U" => self.u = value,
            _ => return Err(unknown_parameter(self.name(), name)),
        }
        Ok(())
    }

    fn create_substitutions(&self, lattice: &Lattice) -> Substitutions {
        bosonic_substitutions(self.modes(lattice))
    }

    fn create_objective(&self, lattice: &Lattice) -> SdpResult<Polynomial> {
        if lattice.boundary().wrap_sign() == Some(-1.0) {
            return Err(SdpError::unsupported(
                "antiperiodic boundary conditions for the Bose-Hubbard model",
            ));
        }

        let mut hamiltonian = Polynomial::zero();
        for r in 0..lattice.sites() {
            let n = Polynomial::number(r);
            let interaction = &n * &(n.clone() - Polynomial::constant(1.0));
            hamiltonian = hamiltonian + interaction * (self.u / 2.0);
            if self.mu != 0.0 {
                hamiltonian = hamiltonian - n * self.mu;
            }
            for (s, phase) in lattice.forward_neighbors(r) {
                hamiltonian = hamiltonian - (hopping(r, s) + hopping(s, r)) * (self.t * phase);
            }
        }
        Ok(hamiltonian)
    }

    fn create_monomials(&self, lattice: &Lattice) -> Vec<Vec<Monomial>> {
        lattice
            .window_starts()
            .flat_map(|start| {
                let window: Vec<usize> = (start..start + lattice.window()).collect();
                pair_blocks(&window)
            })
            .collect()
    }

    fn observables(&self) -> &'static [Observable] {
        &[
            Observable::Gtwo,
            Observable::DensityDensity,
            Observable::MomentumDistribution,
            Observable::ParticleNumber,
            Observable::Primal,
            Observable::Dual,
        ]
    }
}

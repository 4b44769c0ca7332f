//! Spin-1/2 Fermi-Hubbard chain
//!
//! Spin-up mode of site `j` is `j`, spin-down mode is `sites + j`.

use super::lattice::Lattice;
use super::strategy::{operator_words, pair_blocks, unknown_parameter, ModelStrategy};
use crate::algebra::{fermionic_substitutions, Monomial, Operator, Polynomial, Substitutions};
use crate::error::{SdpError, SdpResult};
use crate::observables::Observable;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FermiHubbard {
    pub mu: f64,
    pub t: f64,
    pub h: f64,
    pub u: f64,
}

impl FermiHubbard {
    fn up(site: usize) -> usize {
        site
    }

    fn down(lattice: &Lattice, site: usize) -> usize {
        lattice.sites() + site
    }
}

pub(crate) fn require_chain(lattice: &Lattice, model: &str) -> SdpResult<()> {
    if lattice.is_one_dimensional() {
        Ok(())
    } else {
        Err(SdpError::unsupported(format!(
            "{} on a {}x{} lattice: only chains are implemented",
            model,
            lattice.length(),
            lattice.width()
        )))
    }
}

/// `b_i' b_j + b_j' b_i`
pub(crate) fn hopping_pair(i: usize, j: usize) -> Polynomial {
    let word = |a: usize, b: usize| {
        Monomial::new(vec![Operator::creator(a), Operator::annihilator(b)])
    };
    Polynomial::term(word(i, j), 1.0) + Polynomial::term(word(j, i), 1.0)
}

impl ModelStrategy for FermiHubbard {
    fn name(&self) -> &'static str {
        "fermi-hubbard"
    }

    fn modes(&self, lattice: &Lattice) -> usize {
        2 * lattice.sites()
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![("mu", self.mu), ("t", self.t), ("h", self.h), ("U", self.u)]
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> SdpResult<()> {
        match name {
            "mu" => self.mu = value,
            "t" => self.t = value,
            "h" => self.h = value,
            "U" => self.u = value,
            _ => return Err(unknown_parameter(self.name(), name)),
        }
        Ok(())
    }

    fn create_substitutions(&self, lattice: &Lattice) -> Substitutions {
        fermionic_substitutions(self.modes(lattice))
    }

    fn create_objective(&self, lattice: &Lattice) -> SdpResult<Polynomial> {
        require_chain(lattice, self.name())?;

        let mut hamiltonian = Polynomial::zero();
        for j in 0..lattice.length() {
            let (up, down) = (Self::up(j), Self::down(lattice, j));

            if self.t != 0.0 {
                for (k, phase) in lattice.forward_neighbors(j) {
                    let hop = hopping_pair(up, Self::up(k))
                        + hopping_pair(down, Self::down(lattice, k));
                    hamiltonian = hamiltonian - hop * (self.t * phase);
                }
            }

            if self.u != 0.0 {
                let double = Monomial::new(vec![
                    Operator::creator(up),
                    Operator::creator(down),
                    Operator::annihilator(down),
                    Operator::annihilator(up),
                ]);
                hamiltonian.add_term(double, self.u);
            }

            if self.h != 0.0 {
                let polarization = Polynomial::number(up) - Polynomial::number(down);
                hamiltonian = hamiltonian - polarization * (self.h / 2.0);
            }

            if self.mu != 0.0 {
                let density = Polynomial::number(up) + Polynomial::number(down);
                hamiltonian = hamiltonian - density * self.mu;
            }
        }
        Ok(hamiltonian)
    }

    fn create_monomials(&self, lattice: &Lattice) -> Vec<Vec<Monomial>> {
        let mut blocks = Vec::new();
        for start in lattice.window_starts() {
            let sites = start..start + lattice.window();
            let window: Vec<usize> = sites
                .clone()
                .map(Self::up)
                .chain(sites.map(|j| Self::down(lattice, j)))
                .collect();
            blocks.push(operator_words(&window));
            blocks.extend(pair_blocks(&window));
        }
        blocks
    }

    fn observables(&self) -> &'static [Observable] {
        &[Observable::Primal, Observable::Dual, Observable::Magnetization]
    }

    fn site_density(&self, lattice: &Lattice, site: usize) -> Polynomial {
        Polynomial::number(Self::up(site)) + Polynomial::number(Self::down(lattice, site))
    }

    fn spin_polarization(&self, lattice: &Lattice) -> SdpResult<Polynomial> {
        let sites = 0..lattice.sites();
        let up = Polynomial::total_number(sites.clone().map(Self::up));
        let down = Polynomial::total_number(sites.map(|j| Self::down(lattice, j)));
        Ok((up - down) * 0.5)
    }
}

//! Moment-matrix backend
//!
//! Generates the relaxation structure itself and hands solving to an
//! [`ExternalSolver`]. A numeric level yields one block spanned by every
//! normal-ordered word up to that length; the custom level uses the
//! blocks supplied with the request.

use super::{
    BuildRequest, ConstraintSet, ExternalSolver, MomentBlock, Relaxation, RelaxationLevel,
    SolverBackend,
};
use crate::algebra::{Monomial, Operator, Substitutions};
use crate::error::{SdpError, SdpResult};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

/// Reference backend over the built-in operator algebra
#[derive(Debug, Clone, Default)]
pub struct MomentBackend {
    solver: Option<ExternalSolver>,
}

impl MomentBackend {
    /// Backend that can build and adapt but not solve
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(solver: ExternalSolver) -> Self {
        Self {
            solver: Some(solver),
        }
    }

    pub fn solver(&self) -> Option<&ExternalSolver> {
        self.solver.as_ref()
    }
}

/// Every normal-ordered word of length at most `level`, identity first
pub fn standard_basis(modes: usize, level: u32, substitutions: &Substitutions) -> Vec<Monomial> {
    let letters: Vec<Operator> = (0..modes)
        .map(Operator::annihilator)
        .chain((0..modes).map(Operator::creator))
        .collect();

    let mut basis = vec![Monomial::identity()];
    let mut frontier = vec![Monomial::identity()];
    for _ in 0..level {
        let mut next = Vec::new();
        for word in &frontier {
            for &letter in &letters {
                let candidate = word.concat(&letter.into());
                if substitutions.is_normal(&candidate) {
                    next.push(candidate);
                }
            }
        }
        next.sort();
        basis.extend(next.iter().cloned());
        frontier = next;
    }
    basis
}

/// Replace every word by the monomials of its normal form, keeping the
/// first occurrence of each
fn normalize_block(block: &[Monomial], substitutions: &Substitutions) -> Vec<Monomial> {
    let mut seen = BTreeSet::new();
    let mut basis = Vec::with_capacity(block.len());
    for word in block {
        for monomial in substitutions.reduce_monomial(word).monomials() {
            if seen.insert(monomial.clone()) {
                basis.push(monomial.clone());
            }
        }
    }
    basis
}

impl SolverBackend for MomentBackend {
    fn name(&self) -> &str {
        self.solver.as_ref().map_or("moment", |s| s.name())
    }

    fn build(&self, request: &BuildRequest<'_>) -> SdpResult<Relaxation> {
        let started = Instant::now();
        let subs = request.substitutions;

        let bases = match (request.level, &request.monomials) {
            (RelaxationLevel::Level(k), _) => vec![standard_basis(request.modes, k, subs)],
            (RelaxationLevel::Custom, Some(blocks)) if !blocks.is_empty() => blocks
                .iter()
                .map(|block| normalize_block(block, subs))
                .filter(|basis| !basis.is_empty())
                .collect(),
            (RelaxationLevel::Custom, _) => {
                return Err(SdpError::BuildFailed(
                    "custom level requested without monomial blocks".to_string(),
                ))
            }
        };

        let blocks: Vec<MomentBlock> = bases
            .into_iter()
            .map(|basis| MomentBlock::generate(basis, subs))
            .collect();
        let constraints = request.constraints.reduced(subs);
        let relaxation = Relaxation::new(
            request.modes,
            request.level,
            subs.clone(),
            blocks,
            constraints,
        );

        info!(
            "Generated relaxation: {} blocks, {} moments, {} in {:.2?}",
            relaxation.blocks().len(),
            relaxation.moments().len(),
            relaxation.constraints().shape(),
            started.elapsed()
        );
        Ok(relaxation)
    }

    fn adapt(&self, relaxation: &mut Relaxation, constraints: &ConstraintSet) -> SdpResult<()> {
        let reduced = constraints.reduced(relaxation.substitutions());

        let (new, old) = (reduced.shape(), relaxation.constraints().shape());
        if new != old {
            return Err(SdpError::incompatible(format!(
                "needs {}, relaxation has {}",
                new, old
            )));
        }

        if let Some(missing) = reduced
            .monomials()
            .into_iter()
            .find(|m| !relaxation.moments().contains(m))
        {
            return Err(SdpError::incompatible(format!(
                "moment {} is not part of the relaxation",
                missing
            )));
        }

        debug!("Replacing constraint rows ({})", new);
        relaxation.replace_constraints(reduced);
        Ok(())
    }

    fn solve(&self, relaxation: &mut Relaxation) -> SdpResult<()> {
        let solver = self.solver.as_ref().ok_or(SdpError::SolverUnavailable)?;
        if relaxation.objective().is_none() {
            return Err(SdpError::BuildFailed(
                "relaxation has no objective attached".to_string(),
            ));
        }

        let started = Instant::now();
        info!("Solving relaxation with {}", solver.name());
        let solution = solver.run(relaxation)?;
        info!(
            "Solved in {:.2?}: primal {}, dual {}",
            started.elapsed(),
            solution.primal,
            solution.dual
        );
        relaxation.record_solution(solution);
        Ok(())
    }
}

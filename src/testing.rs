//! Test doubles counting factory and backend invocations

use crate::algebra::{Monomial, Polynomial, Substitutions};
use crate::error::{SdpError, SdpResult};
use crate::model::{BoseHubbard, Lattice, ModelStrategy};
use crate::observables::Observable;
use crate::relaxation::{
    BuildRequest, ConstraintSet, MomentBackend, Relaxation, Solution, SolverBackend,
};
use std::cell::Cell;
use std::rc::Rc;

/// Shared invocation counters
#[derive(Debug, Clone, Default)]
pub struct Counters {
    substitutions: Rc<Cell<usize>>,
    objectives: Rc<Cell<usize>>,
    monomials: Rc<Cell<usize>>,
    builds: Rc<Cell<usize>>,
    adapts: Rc<Cell<usize>>,
    solves: Rc<Cell<usize>>,
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

impl Counters {
    pub fn substitutions(&self) -> usize {
        self.substitutions.get()
    }

    pub fn objectives(&self) -> usize {
        self.objectives.get()
    }

    pub fn monomials(&self) -> usize {
        self.monomials.get()
    }

    pub fn builds(&self) -> usize {
        self.builds.get()
    }

    pub fn adapts(&self) -> usize {
        self.adapts.get()
    }

    pub fn solves(&self) -> usize {
        self.solves.get()
    }
}

/// Bose-Hubbard strategy that counts factory calls
pub struct CountingStrategy {
    inner: BoseHubbard,
    counters: Counters,
}

impl CountingStrategy {
    pub fn new(counters: Counters) -> Self {
        Self {
            inner: BoseHubbard::default(),
            counters,
        }
    }
}

impl ModelStrategy for CountingStrategy {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        self.inner.parameters()
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> SdpResult<()> {
        self.inner.set_parameter(name, value)
    }

    fn create_substitutions(&self, lattice: &Lattice) -> Substitutions {
        bump(&self.counters.substitutions);
        self.inner.create_substitutions(lattice)
    }

    fn create_objective(&self, lattice: &Lattice) -> SdpResult<Polynomial> {
        bump(&self.counters.objectives);
        self.inner.create_objective(lattice)
    }

    fn create_monomials(&self, lattice: &Lattice) -> Vec<Vec<Monomial>> {
        bump(&self.counters.monomials);
        self.inner.create_monomials(lattice)
    }

    fn observables(&self) -> &'static [Observable] {
        self.inner.observables()
    }
}

/// How [`StubBackend`] answers adaptation requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptPolicy {
    /// Use the moment backend's compatibility rule
    Delegate,
    /// Refuse every adaptation as incompatible
    AlwaysFail,
}

/// Moment backend with a deterministic in-process solver
pub struct StubBackend {
    inner: MomentBackend,
    counters: Counters,
    policy: AdaptPolicy,
    fail_solves: bool,
}

impl StubBackend {
    /// Value reported for every moment
    pub const MOMENT_VALUE: f64 = 0.25;
    pub const PRIMAL: f64 = -1.5;

    pub fn new(counters: &Counters) -> Self {
        Self {
            inner: MomentBackend::new(),
            counters: counters.clone(),
            policy: AdaptPolicy::Delegate,
            fail_solves: false,
        }
    }

    pub fn with_policy(mut self, policy: AdaptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn failing_solves(mut self) -> Self {
        self.fail_solves = true;
        self
    }
}

impl SolverBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn build(&self, request: &BuildRequest<'_>) -> SdpResult<Relaxation> {
        bump(&self.counters.builds);
        self.inner.build(request)
    }

    fn adapt(&self, relaxation: &mut Relaxation, constraints: &ConstraintSet) -> SdpResult<()> {
        bump(&self.counters.adapts);
        match self.policy {
            AdaptPolicy::Delegate => self.inner.adapt(relaxation, constraints),
            AdaptPolicy::AlwaysFail => Err(SdpError::incompatible("stub refuses")),
        }
    }

    fn solve(&self, relaxation: &mut Relaxation) -> SdpResult<()> {
        bump(&self.counters.solves);
        if self.fail_solves {
            return Err(SdpError::SolverFailed {
                solver: "stub".to_string(),
                reason: "configured to fail".to_string(),
            });
        }
        if relaxation.objective().is_none() {
            return Err(SdpError::BuildFailed("no objective".to_string()));
        }

        let identity = |n: usize| -> Vec<Vec<f64>> {
            (0..n)
                .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
                .collect()
        };
        let x_mat = relaxation
            .blocks()
            .iter()
            .map(|b| identity(b.dimension()))
            .collect();
        let moments = relaxation
            .moments()
            .iter()
            .map(|m| (m.clone(), Self::MOMENT_VALUE))
            .collect();

        relaxation.record_solution(Solution {
            primal: Self::PRIMAL,
            dual: Self::PRIMAL,
            x_mat,
            y_mat: vec![],
            moments,
        });
        Ok(())
    }
}

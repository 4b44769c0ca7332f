//! Lattice models and the invalidation dispatcher
//!
//! [`LatticeModel`] holds the mutable configuration of one model instance
//! and the lazily derived artifacts. Every setter marks the artifacts
//! downstream of it stale; the next read rebuilds only what is missing,
//! trying the store and the outdated relaxation before a full rebuild.

pub mod bose_hubbard;
pub mod constraints;
pub mod factory;
pub mod fermi_hubbard;
pub mod kitaev;
pub mod lattice;
pub mod strategy;

pub use bose_hubbard::BoseHubbard;
pub use constraints::{ConstraintKind, Constraints};
pub use factory::{create_strategy, ModelKind};
pub use fermi_hubbard::FermiHubbard;
pub use kitaev::LongRangeKitaev;
pub use lattice::{Boundary, Lattice};
pub use strategy::ModelStrategy;

use crate::algebra::{Monomial, Polynomial, Substitutions};
use crate::cache::{recycle_or_rebuild, ArtifactStore, Cached, Outcome, RetainingCache};
use crate::error::{SdpError, SdpResult};
use crate::fingerprint::{full_fingerprint, short_fingerprint, Fingerprints};
use crate::relaxation::{
    BuildRequest, Matrix, Relaxation, RelaxationLevel, Solution, SolverBackend,
};
use tracing::{debug, info, warn};

/// Current relaxation plus the outdated one kept for recycling
pub type RelaxationSlot = RetainingCache<Relaxation>;

/// Which derived artifacts are currently held in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheState {
    pub substitutions: bool,
    pub objective: bool,
    pub relaxation: bool,
    pub outdated: bool,
}

/// A lattice model with cached, persisted relaxations
pub struct LatticeModel {
    lattice: Lattice,
    level: RelaxationLevel,
    constraints: Constraints,
    strategy: Box<dyn ModelStrategy>,
    backend: Box<dyn SolverBackend>,
    store: Option<ArtifactStore>,
    substitutions: Cached<Substitutions>,
    objective: Cached<Polynomial>,
    relaxation: RelaxationSlot,
    last_outcome: Option<Outcome>,
}

impl LatticeModel {
    /// Create a model at the `custom` level with no constraints and no store
    pub fn new(
        lattice: Lattice,
        strategy: Box<dyn ModelStrategy>,
        backend: Box<dyn SolverBackend>,
    ) -> Self {
        Self {
            lattice,
            level: RelaxationLevel::default(),
            constraints: Constraints::default(),
            strategy,
            backend,
            store: None,
            substitutions: Cached::new(),
            objective: Cached::new(),
            relaxation: RelaxationSlot::new(),
            last_outcome: None,
        }
    }

    /// Persist relaxations in `store`
    pub fn with_store(mut self, store: ArtifactStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn level(&self) -> RelaxationLevel {
        self.level
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn store(&self) -> Option<&ArtifactStore> {
        self.store.as_ref()
    }

    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn strategy(&self) -> &dyn ModelStrategy {
        self.strategy.as_ref()
    }

    pub fn modes(&self) -> usize {
        self.strategy.modes(&self.lattice)
    }

    pub fn parameters(&self) -> Vec<(&'static str, f64)> {
        self.strategy.parameters()
    }

    /// How the current relaxation was obtained, if one was resolved
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn cache_state(&self) -> CacheState {
        CacheState {
            substitutions: self.substitutions.is_fresh(),
            objective: self.objective.is_fresh(),
            relaxation: self.relaxation.is_fresh(),
            outdated: self.relaxation.has_outdated(),
        }
    }

    pub fn fingerprints(&self) -> Fingerprints {
        Fingerprints {
            short: short_fingerprint(&self.lattice, self.level),
            full: full_fingerprint(
                &self.lattice,
                self.level,
                &self.strategy.parameters(),
                &self.constraints,
            ),
        }
    }

    // Dispatcher

    /// Set a physical parameter; stales the objective and the relaxation
    pub fn set_parameter(&mut self, name: &str, value: f64) -> SdpResult<()> {
        self.strategy.set_parameter(name, value)?;
        debug!("Parameter {} = {}", name, value);
        self.invalidate_objective();
        Ok(())
    }

    /// Set a constraint; stales the relaxation only if the value changed
    pub fn set_constraint(&mut self, kind: ConstraintKind, value: f64) {
        if self.constraints.set(kind, value) {
            debug!("Constraint {} = {}", kind, value);
            self.invalidate_relaxation();
        }
    }

    /// Remove a constraint; no-op when it was not set
    pub fn unset_constraint(&mut self, kind: ConstraintKind) {
        if self.constraints.unset(kind) {
            debug!("Constraint {} unset", kind);
            self.invalidate_relaxation();
        }
    }

    pub fn set_level(&mut self, level: RelaxationLevel) {
        self.invalidate_relaxation();
        self.level = level;
    }

    fn invalidate_objective(&mut self) {
        self.objective.invalidate();
        self.invalidate_relaxation();
    }

    fn invalidate_relaxation(&mut self) {
        if self.relaxation.invalidate() {
            debug!("Relaxation marked outdated");
        }
    }

    // Derived artifacts

    pub fn substitutions(&mut self) -> &Substitutions {
        let (strategy, lattice) = (&self.strategy, &self.lattice);
        self.substitutions
            .get_or_init(|| strategy.create_substitutions(lattice))
    }

    pub fn objective(&mut self) -> SdpResult<&Polynomial> {
        let (strategy, lattice) = (&self.strategy, &self.lattice);
        let objective = self
            .objective
            .get_or_try_init(|| strategy.create_objective(lattice))?;
        Ok(objective)
    }

    /// The relaxation for the current configuration, built if necessary
    pub fn relaxation(&mut self) -> SdpResult<&Relaxation> {
        let relaxation = match self.relaxation.take_current() {
            Some(relaxation) => relaxation,
            None => self.resolve_relaxation()?,
        };
        Ok(self.relaxation.install(relaxation))
    }

    /// Monomial bases of the relaxation blocks
    pub fn monomial_sets(&mut self) -> SdpResult<Vec<Vec<Monomial>>> {
        Ok(self.relaxation()?.monomial_sets())
    }

    fn resolve_relaxation(&mut self) -> SdpResult<Relaxation> {
        let fingerprints = self.fingerprints();
        let loaded = self
            .store
            .as_ref()
            .and_then(|store| store.load(self.strategy.name(), &fingerprints))
            .map(|loaded| loaded.relaxation);
        let level = self.level;
        let outdated = self.relaxation.take_outdated().filter(|outdated| {
            let same_level = outdated.level() == level;
            if !same_level {
                debug!("Discarding outdated relaxation at level {}", outdated.level());
            }
            same_level
        });

        let modes = self.strategy.modes(&self.lattice);
        let constraints = self.constraints.to_constraint_set(modes);
        let (strategy, lattice, backend) = (&self.strategy, &self.lattice, &*self.backend);
        let substitutions: &Substitutions = self
            .substitutions
            .get_or_init(|| strategy.create_substitutions(lattice));

        let rebuild = || {
            info!(
                "Generating relaxation for {} at level {}",
                lattice, level
            );
            let monomials = level.is_custom().then(|| strategy.create_monomials(lattice));
            backend.build(&BuildRequest {
                modes,
                level,
                monomials,
                substitutions,
                constraints: &constraints,
            })
        };
        let (relaxation, outcome) =
            recycle_or_rebuild(loaded, outdated, &constraints, backend, rebuild)?;

        self.last_outcome = Some(outcome);
        if outcome != Outcome::Loaded {
            self.persist(&relaxation);
        }
        Ok(relaxation)
    }

    /// Write `relaxation` to the store. A failed write only costs a later
    /// rebuild, so it is logged and the in-memory artifact stays usable.
    fn persist(&self, relaxation: &Relaxation) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(self.strategy.name(), &self.fingerprints(), relaxation) {
                warn!("Could not persist relaxation to {}: {}", store.dir().display(), e);
            }
        }
    }

    // Solving

    /// Solve the relaxation unless it already is; persists the solution
    pub fn solve(&mut self) -> SdpResult<()> {
        let mut relaxation = match self.relaxation.take_current() {
            Some(relaxation) => relaxation,
            None => self.resolve_relaxation()?,
        };
        let result = self.solve_relaxation(&mut relaxation);
        self.relaxation.install(relaxation);
        result
    }

    fn solve_relaxation(&mut self, relaxation: &mut Relaxation) -> SdpResult<()> {
        if relaxation.is_solved() {
            return Ok(());
        }

        let objective = self.objective()?.clone();
        relaxation.set_objective(&objective);
        if let Err(e) = self.backend.solve(relaxation) {
            relaxation.mark_unsolved();
            return Err(e);
        }
        self.persist(relaxation);
        Ok(())
    }

    /// Solution of the current configuration, solving first if needed
    pub fn solution(&mut self) -> SdpResult<&Solution> {
        self.solve()?;
        self.relaxation
            .current()
            .and_then(Relaxation::solution)
            .ok_or_else(|| SdpError::MomentUnavailable("relaxation has no solution".to_string()))
    }

    pub fn primal(&mut self) -> SdpResult<f64> {
        Ok(self.solution()?.primal)
    }

    pub fn dual(&mut self) -> SdpResult<f64> {
        Ok(self.solution()?.dual)
    }

    pub fn gap(&mut self) -> SdpResult<f64> {
        Ok(self.solution()?.gap())
    }

    /// Ground-state energy bound, the primal value
    pub fn energy(&mut self) -> SdpResult<f64> {
        self.primal()
    }

    pub fn x_mat(&mut self) -> SdpResult<&[Matrix]> {
        Ok(&self.solution()?.x_mat)
    }

    pub fn y_mat(&mut self) -> SdpResult<&[Matrix]> {
        Ok(&self.solution()?.y_mat)
    }

    /// Expectation value of `operator` in the solved state
    pub fn expectation(&mut self, operator: &Polynomial) -> SdpResult<f64> {
        self.solve()?;
        match self.relaxation.current() {
            Some(relaxation) => relaxation.expectation(operator),
            None => Err(SdpError::MomentUnavailable(operator.to_string())),
        }
    }
}

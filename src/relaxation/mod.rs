//! Moment relaxations and the solver backend seam
//!
//! A [`Relaxation`] is the optimization-problem artifact: moment matrix
//! blocks, constraint rows, an optional objective and, once solved, the
//! solution. Backends build, adapt and solve relaxations; the core only
//! talks to them through [`SolverBackend`].
//!
//! # Status
//!
//! | Status | Objective | Solution | Persisted under |
//! |--------|-----------|----------|-----------------|
//! | Unsolved | absent or stale | none | short fingerprint |
//! | Solved | attached | primal, dual, matrices, moments | full fingerprint |

pub mod external;
pub mod moment;

pub use external::ExternalSolver;
pub use moment::MomentBackend;

use crate::algebra::{Monomial, Polynomial, Substitutions};
use crate::error::{SdpError, SdpResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Relaxation level, or the sentinel deferring to custom monomial blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelaxationLevel {
    /// Monomial blocks come from the model strategy
    #[default]
    Custom,
    /// Standard hierarchy level
    Level(u32),
}

impl RelaxationLevel {
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

impl fmt::Display for RelaxationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom => write!(f, "custom"),
            Self::Level(k) => write!(f, "{}", k),
        }
    }
}

impl FromStr for RelaxationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "custom" | "-1" => Ok(Self::Custom),
            _ => match s.parse::<u32>() {
                Ok(0) => Err("relaxation level must be at least 1".to_string()),
                Ok(k) => Ok(Self::Level(k)),
                Err(_) => Err(format!("invalid relaxation level '{s}': expected a positive integer or 'custom'")),
            },
        }
    }
}

/// Solve status of a relaxation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    #[default]
    Unsolved,
    Solved,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsolved => write!(f, "unsolved"),
            Self::Solved => write!(f, "solved"),
        }
    }
}

/// Dense real matrix, row major
pub type Matrix = Vec<Vec<f64>>;

/// Result of a successful solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub primal: f64,
    pub dual: f64,
    /// Primal moment matrices, one per block
    pub x_mat: Vec<Matrix>,
    /// Dual matrices, one per block
    pub y_mat: Vec<Matrix>,
    /// Value of every solved moment
    #[serde(default)]
    pub moments: Vec<(Monomial, f64)>,
}

impl Solution {
    pub fn gap(&self) -> f64 {
        self.primal - self.dual
    }

    /// Value of a normal-ordered moment. The identity is always 1.
    pub fn moment(&self, monomial: &Monomial) -> Option<f64> {
        if monomial.is_identity() {
            return Some(1.0);
        }
        self.moments
            .iter()
            .find(|(m, _)| m == monomial)
            .map(|(_, value)| *value)
    }
}

/// Counts of each constraint kind; two relaxations with equal shape can
/// exchange constraint rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintShape {
    pub equalities: usize,
    pub inequalities: usize,
    pub moment_inequalities: usize,
}

impl fmt::Display for ConstraintShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} equalities, {} inequalities, {} moment inequalities",
            self.equalities, self.inequalities, self.moment_inequalities
        )
    }
}

/// Constraint rows expressed in the operator algebra
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// `p == 0`
    pub equalities: Vec<Polynomial>,
    /// Localizing constraints `p >= 0`
    pub inequalities: Vec<Polynomial>,
    /// Scalar constraints `<p> >= 0`
    pub moment_inequalities: Vec<Polynomial>,
}

impl ConstraintSet {
    pub fn shape(&self) -> ConstraintShape {
        ConstraintShape {
            equalities: self.equalities.len(),
            inequalities: self.inequalities.len(),
            moment_inequalities: self.moment_inequalities.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.equalities.is_empty()
            && self.inequalities.is_empty()
            && self.moment_inequalities.is_empty()
    }

    fn rows(&self) -> impl Iterator<Item = &Polynomial> {
        self.equalities
            .iter()
            .chain(&self.inequalities)
            .chain(&self.moment_inequalities)
    }

    /// Every non-identity monomial appearing in any row
    pub fn monomials(&self) -> BTreeSet<Monomial> {
        self.rows()
            .flat_map(Polynomial::monomials)
            .filter(|m| !m.is_identity())
            .cloned()
            .collect()
    }

    /// Rows with the substitution rules applied
    pub fn reduced(&self, substitutions: &Substitutions) -> Self {
        let reduce = |rows: &[Polynomial]| -> Vec<Polynomial> {
            rows.iter().map(|p| substitutions.reduce(p)).collect()
        };
        Self {
            equalities: reduce(&self.equalities),
            inequalities: reduce(&self.inequalities),
            moment_inequalities: reduce(&self.moment_inequalities),
        }
    }
}

/// One positive semidefinite block of the moment matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentBlock {
    /// Row/column labels
    pub basis: Vec<Monomial>,
    /// `entries[i][j]` is the reduced form of `basis[i]' * basis[j]`
    pub entries: Vec<Vec<Polynomial>>,
}

impl MomentBlock {
    /// Generate the block spanned by `basis`
    pub fn generate(basis: Vec<Monomial>, substitutions: &Substitutions) -> Self {
        let entries = basis
            .iter()
            .map(|row| {
                let left = row.adjoint();
                basis
                    .iter()
                    .map(|col| substitutions.reduce_monomial(&left.concat(col)))
                    .collect()
            })
            .collect();
        Self { basis, entries }
    }

    pub fn dimension(&self) -> usize {
        self.basis.len()
    }
}

/// Non-identity moments of the blocks and the constraint rows
fn collect_moments(blocks: &[MomentBlock], constraints: &ConstraintSet) -> BTreeSet<Monomial> {
    let mut moments: BTreeSet<Monomial> = blocks
        .iter()
        .flat_map(|b| b.entries.iter().flatten())
        .flat_map(Polynomial::monomials)
        .filter(|m| !m.is_identity())
        .cloned()
        .collect();
    moments.extend(constraints.monomials());
    moments
}

/// The optimization-problem artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relaxation {
    modes: usize,
    level: RelaxationLevel,
    substitutions: Substitutions,
    blocks: Vec<MomentBlock>,
    moments: BTreeSet<Monomial>,
    constraints: ConstraintSet,
    objective: Option<Polynomial>,
    status: SolveStatus,
    solution: Option<Solution>,
}

impl Relaxation {
    /// Assemble an unsolved relaxation. `constraints` must already be
    /// reduced by `substitutions`.
    pub fn new(
        modes: usize,
        level: RelaxationLevel,
        substitutions: Substitutions,
        blocks: Vec<MomentBlock>,
        constraints: ConstraintSet,
    ) -> Self {
        let moments = collect_moments(&blocks, &constraints);
        Self {
            modes,
            level,
            substitutions,
            blocks,
            moments,
            constraints,
            objective: None,
            status: SolveStatus::Unsolved,
            solution: None,
        }
    }

    pub fn modes(&self) -> usize {
        self.modes
    }

    pub fn level(&self) -> RelaxationLevel {
        self.level
    }

    pub fn substitutions(&self) -> &Substitutions {
        &self.substitutions
    }

    pub fn blocks(&self) -> &[MomentBlock] {
        &self.blocks
    }

    /// Monomial bases of all blocks
    pub fn monomial_sets(&self) -> Vec<Vec<Monomial>> {
        self.blocks.iter().map(|b| b.basis.clone()).collect()
    }

    /// Distinct moments (non-identity) the relaxation optimizes over
    pub fn moments(&self) -> &BTreeSet<Monomial> {
        &self.moments
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Polynomial> {
        self.objective.as_ref()
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn is_solved(&self) -> bool {
        self.status == SolveStatus::Solved
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Attach the objective, reduced by the relaxation's own rules
    pub fn set_objective(&mut self, objective: &Polynomial) {
        self.objective = Some(self.substitutions.reduce(objective));
    }

    /// Swap in new (reduced) constraint rows, dropping objective and solution
    pub fn replace_constraints(&mut self, constraints: ConstraintSet) {
        self.moments = collect_moments(&self.blocks, &constraints);
        self.constraints = constraints;
        self.objective = None;
        self.mark_unsolved();
    }

    /// Store a solution; the only transition into `Solved`
    pub fn record_solution(&mut self, solution: Solution) {
        self.solution = Some(solution);
        self.status = SolveStatus::Solved;
    }

    pub fn mark_unsolved(&mut self) {
        self.solution = None;
        self.status = SolveStatus::Unsolved;
    }

    /// Expectation value of `operator` in the solved state
    pub fn expectation(&self, operator: &Polynomial) -> SdpResult<f64> {
        let solution = self
            .solution
            .as_ref()
            .ok_or_else(|| SdpError::MomentUnavailable("relaxation is unsolved".to_string()))?;

        self.substitutions
            .reduce(operator)
            .terms()
            .try_fold(0.0, |acc, (m, c)| match solution.moment(m) {
                Some(value) => Ok(acc + c * value),
                None => Err(SdpError::MomentUnavailable(m.to_string())),
            })
    }
}

/// Everything a backend needs to generate a relaxation from scratch
#[derive(Debug)]
pub struct BuildRequest<'a> {
    pub modes: usize,
    pub level: RelaxationLevel,
    /// Custom blocks, present exactly when `level` is `Custom`
    pub monomials: Option<Vec<Vec<Monomial>>>,
    pub substitutions: &'a Substitutions,
    pub constraints: &'a ConstraintSet,
}

/// Solver library interface
///
/// `adapt` must fail with [`SdpError::RecycleIncompatible`] when the
/// relaxation cannot take the new constraints; the recycler treats any
/// other error as fatal.
pub trait SolverBackend {
    /// Human-readable backend name for logs
    fn name(&self) -> &str;

    /// Generate a fresh unsolved relaxation
    fn build(&self, request: &BuildRequest<'_>) -> SdpResult<Relaxation>;

    /// Replace the constraint rows of an existing relaxation in place
    fn adapt(&self, relaxation: &mut Relaxation, constraints: &ConstraintSet) -> SdpResult<()>;

    /// Solve a relaxation with an attached objective, recording the solution
    fn solve(&self, relaxation: &mut Relaxation) -> SdpResult<()>;
}

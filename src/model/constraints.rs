//! Particle-number constraints and their constraint rows

use crate::algebra::{Monomial, Operator, Polynomial};
use crate::relaxation::ConstraintSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of particle-number bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Exact total particle number
    N,
    /// Lower bound on the total particle number
    Nmin,
    /// Upper bound on the total particle number
    Nmax,
    /// Upper bound on every site occupation
    LocalNmax,
}

impl ConstraintKind {
    /// Fingerprint order
    pub const ALL: [ConstraintKind; 4] = [Self::N, Self::Nmax, Self::Nmin, Self::LocalNmax];

    pub fn key(&self) -> &'static str {
        match self {
            Self::N => "n",
            Self::Nmin => "nmin",
            Self::Nmax => "nmax",
            Self::LocalNmax => "localnmax",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ConstraintKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "n" => Ok(Self::N),
            "nmin" => Ok(Self::Nmin),
            "nmax" => Ok(Self::Nmax),
            "localnmax" => Ok(Self::LocalNmax),
            _ => Err(format!(
                "unknown constraint '{s}': expected n, nmin, nmax or localnmax"
            )),
        }
    }
}

/// Currently set constraint values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    n: Option<f64>,
    nmin: Option<f64>,
    nmax: Option<f64>,
    local_nmax: Option<f64>,
}

impl Constraints {
    fn slot(&mut self, kind: ConstraintKind) -> &mut Option<f64> {
        match kind {
            ConstraintKind::N => &mut self.n,
            ConstraintKind::Nmin => &mut self.nmin,
            ConstraintKind::Nmax => &mut self.nmax,
            ConstraintKind::LocalNmax => &mut self.local_nmax,
        }
    }

    pub fn get(&self, kind: ConstraintKind) -> Option<f64> {
        match kind {
            ConstraintKind::N => self.n,
            ConstraintKind::Nmin => self.nmin,
            ConstraintKind::Nmax => self.nmax,
            ConstraintKind::LocalNmax => self.local_nmax,
        }
    }

    /// Set a value. Returns true when it was unset or differed.
    pub fn set(&mut self, kind: ConstraintKind, value: f64) -> bool {
        let slot = self.slot(kind);
        if *slot == Some(value) {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Clear a value. Returns true when it was set.
    pub fn unset(&mut self, kind: ConstraintKind) -> bool {
        self.slot(kind).take().is_some()
    }

    /// Set constraints in fingerprint order
    pub fn iter(&self) -> impl Iterator<Item = (ConstraintKind, f64)> + '_ {
        ConstraintKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|v| (kind, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Constraint rows over `modes` modes, before substitution
    ///
    /// An exact `n` adds the two scalar bounds plus, for every mode, the
    /// bound multiplied from the left by the occupation `b'b` and by the
    /// vacancy `bb'`.
    pub fn to_constraint_set(&self, modes: usize) -> ConstraintSet {
        let mut set = ConstraintSet::default();
        let total = Polynomial::total_number(0..modes);

        if let Some(local) = self.local_nmax {
            set.inequalities.extend(
                (0..modes).map(|i| Polynomial::constant(local) - Polynomial::number(i)),
            );
        }

        if let Some(n) = self.n {
            let below = Polynomial::constant(n) - total.clone();
            let above = total.clone() - Polynomial::constant(n);
            set.moment_inequalities.push(below.clone());
            set.moment_inequalities.push(above.clone());

            for i in 0..modes {
                let occupation = Polynomial::number(i);
                let vacancy = Polynomial::term(
                    Monomial::new(vec![Operator::annihilator(i), Operator::creator(i)]),
                    1.0,
                );
                for op in [&occupation, &vacancy] {
                    set.moment_inequalities.push(op * &below);
                    set.moment_inequalities.push(op * &above);
                }
            }
        }

        if let Some(nmax) = self.nmax {
            set.moment_inequalities
                .push(Polynomial::constant(nmax) - total.clone());
        }

        if let Some(nmin) = self.nmin {
            set.moment_inequalities
                .push(total - Polynomial::constant(nmin));
        }

        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_reports_change() {
        let mut constraints = Constraints::default();
        assert!(constraints.set(ConstraintKind::N, 2.0));
        assert!(!constraints.set(ConstraintKind::N, 2.0));
        assert!(constraints.set(ConstraintKind::N, 3.0));
        assert_eq!(constraints.get(ConstraintKind::N), Some(3.0));
    }

    #[test]
    fn unset_reports_presence() {
        let mut constraints = Constraints::default();
        assert!(!constraints.unset(ConstraintKind::Nmax));
        constraints.set(ConstraintKind::Nmax, 4.0);
        assert!(constraints.unset(ConstraintKind::Nmax));
        assert!(constraints.is_empty());
    }

    #[test]
    fn iter_uses_fingerprint_order() {
        let mut constraints = Constraints::default();
        constraints.set(ConstraintKind::LocalNmax, 1.0);
        constraints.set(ConstraintKind::Nmin, 0.0);
        constraints.set(ConstraintKind::N, 2.0);
        let kinds: Vec<_> = constraints.iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![ConstraintKind::N, ConstraintKind::Nmin, ConstraintKind::LocalNmax]
        );
    }

    #[test]
    fn exact_number_rows() {
        let mut constraints = Constraints::default();
        constraints.set(ConstraintKind::N, 2.0);
        let set = constraints.to_constraint_set(4);
        assert_eq!(set.moment_inequalities.len(), 2 + 4 * 4);
        assert!(set.inequalities.is_empty());
        assert!(set.equalities.is_empty());
    }

    #[test]
    fn bound_rows() {
        let mut constraints = Constraints::default();
        constraints.set(ConstraintKind::LocalNmax, 1.0);
        constraints.set(ConstraintKind::Nmax, 3.0);
        constraints.set(ConstraintKind::Nmin, 1.0);
        let set = constraints.to_constraint_set(3);
        assert_eq!(set.inequalities.len(), 3);
        assert_eq!(set.moment_inequalities.len(), 2);
    }

    #[test]
    fn kind_parses_variants() {
        assert_eq!("local-nmax".parse::<ConstraintKind>().unwrap(), ConstraintKind::LocalNmax);
        assert_eq!("localNmax".parse::<ConstraintKind>().unwrap(), ConstraintKind::LocalNmax);
        assert!("density".parse::<ConstraintKind>().is_err());
    }
}

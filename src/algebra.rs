//! Non-commutative operator algebra for lattice models
//!
//! Mode operators, operator words (monomials), real polynomials over them
//! and rewrite rules that bring words into normal order. Bosonic and
//! fermionic rule sets are provided; both terminate because every rule
//! moves creators left and sorts equal kinds by mode.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A single creation or annihilation operator acting on one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Operator {
    /// Mode index
    pub mode: usize,
    /// True for the creation operator
    pub dagger: bool,
}

impl Operator {
    /// Annihilation operator on `mode`
    pub fn annihilator(mode: usize) -> Self {
        Self { mode, dagger: false }
    }

    /// Creation operator on `mode`
    pub fn creator(mode: usize) -> Self {
        Self { mode, dagger: true }
    }

    /// Hermitian adjoint
    pub fn adjoint(self) -> Self {
        Self {
            mode: self.mode,
            dagger: !self.dagger,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dagger {
            write!(f, "b{}'", self.mode)
        } else {
            write!(f, "b{}", self.mode)
        }
    }
}

/// An ordered product of operators. The empty word is the identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Monomial(Vec<Operator>);

impl Monomial {
    pub fn identity() -> Self {
        Self(Vec::new())
    }

    pub fn new(operators: Vec<Operator>) -> Self {
        Self(operators)
    }

    pub fn operators(&self) -> &[Operator] {
        &self.0
    }

    pub fn degree(&self) -> usize {
        self.0.len()
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_empty()
    }

    /// Reversed word with every operator adjointed
    pub fn adjoint(&self) -> Self {
        Self(self.0.iter().rev().map(|op| op.adjoint()).collect())
    }

    /// Word product `self * other`
    pub fn concat(&self, other: &Monomial) -> Self {
        let mut ops = Vec::with_capacity(self.0.len() + other.0.len());
        ops.extend_from_slice(&self.0);
        ops.extend_from_slice(&other.0);
        Self(ops)
    }

    fn window(&self, start: usize, len: usize) -> Option<Monomial> {
        self.0.get(start..start + len).map(|ops| Monomial(ops.to_vec()))
    }
}

impl From<Operator> for Monomial {
    fn from(op: Operator) -> Self {
        Self(vec![op])
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "1");
        }
        for (i, op) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// A real linear combination of monomials, kept in canonical order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(Monomial, f64)>", into = "Vec<(Monomial, f64)>")]
pub struct Polynomial {
    terms: BTreeMap<Monomial, f64>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self::term(Monomial::identity(), value)
    }

    pub fn term(monomial: Monomial, coefficient: f64) -> Self {
        let mut poly = Self::zero();
        poly.add_term(monomial, coefficient);
        poly
    }

    /// Number operator `b'_mode b_mode`
    pub fn number(mode: usize) -> Self {
        Self::term(
            Monomial::new(vec![Operator::creator(mode), Operator::annihilator(mode)]),
            1.0,
        )
    }

    /// Total number operator over `modes`
    pub fn total_number(modes: impl IntoIterator<Item = usize>) -> Self {
        modes.into_iter().map(Self::number).sum()
    }

    /// Accumulate `coefficient * monomial`, dropping terms that cancel
    pub fn add_term(&mut self, monomial: Monomial, coefficient: f64) {
        if coefficient == 0.0 {
            return;
        }
        let value = self.coefficient(&monomial) + coefficient;
        if value == 0.0 {
            self.terms.remove(&monomial);
        } else {
            self.terms.insert(monomial, value);
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, f64)> {
        self.terms.iter().map(|(m, c)| (m, *c))
    }

    pub fn monomials(&self) -> impl Iterator<Item = &Monomial> {
        self.terms.keys()
    }

    pub fn coefficient(&self, monomial: &Monomial) -> f64 {
        self.terms.get(monomial).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Hermitian adjoint (coefficients are real)
    pub fn adjoint(&self) -> Self {
        let mut out = Self::zero();
        for (m, c) in self.terms() {
            out.add_term(m.adjoint(), c);
        }
        out
    }

    pub fn scale(&self, factor: f64) -> Self {
        let mut out = Self::zero();
        for (m, c) in self.terms() {
            out.add_term(m.clone(), c * factor);
        }
        out
    }

    /// Highest word length among the terms
    pub fn degree(&self) -> usize {
        self.terms.keys().map(Monomial::degree).max().unwrap_or(0)
    }
}

impl From<Vec<(Monomial, f64)>> for Polynomial {
    fn from(terms: Vec<(Monomial, f64)>) -> Self {
        let mut poly = Self::zero();
        for (m, c) in terms {
            poly.add_term(m, c);
        }
        poly
    }
}

impl From<Polynomial> for Vec<(Monomial, f64)> {
    fn from(poly: Polynomial) -> Self {
        poly.terms.into_iter().collect()
    }
}

impl From<Operator> for Polynomial {
    fn from(op: Operator) -> Self {
        Self::term(op.into(), 1.0)
    }
}

impl From<Monomial> for Polynomial {
    fn from(monomial: Monomial) -> Self {
        Self::term(monomial, 1.0)
    }
}

impl From<f64> for Polynomial {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(mut self, rhs: Polynomial) -> Polynomial {
        for (m, c) in rhs.terms {
            self.add_term(m, c);
        }
        self
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial {
        self + (-rhs)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.scale(-1.0)
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut out = Polynomial::zero();
        for (lm, lc) in self.terms() {
            for (rm, rc) in rhs.terms() {
                out.add_term(lm.concat(rm), lc * rc);
            }
        }
        out
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Polynomial) -> Polynomial {
        &self * &rhs
    }
}

impl Mul<f64> for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: f64) -> Polynomial {
        self.scale(rhs)
    }
}

impl std::iter::Sum for Polynomial {
    fn sum<I: Iterator<Item = Polynomial>>(iter: I) -> Self {
        iter.fold(Polynomial::zero(), |acc, p| acc + p)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (m, c)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if m.is_identity() {
                write!(f, "{}", c)?;
            } else if *c == 1.0 {
                write!(f, "{}", m)?;
            } else {
                write!(f, "{}*{}", c, m)?;
            }
        }
        Ok(())
    }
}

/// Replace every occurrence of `lhs` with `rhs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub lhs: Monomial,
    pub rhs: Polynomial,
}

impl RewriteRule {
    pub fn new(lhs: Monomial, rhs: Polynomial) -> Self {
        Self { lhs, rhs }
    }
}

/// A terminating set of rewrite rules
///
/// Reduction applies the leftmost matching rule until no rule matches.
/// Rule sets that can rewrite a word back into itself never terminate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RewriteRule>", into = "Vec<RewriteRule>")]
pub struct Substitutions {
    rules: Vec<RewriteRule>,
    index: BTreeMap<Monomial, usize>,
    lengths: BTreeSet<usize>,
}

impl Substitutions {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        let mut index = BTreeMap::new();
        let mut lengths = BTreeSet::new();
        for (i, rule) in rules.iter().enumerate() {
            lengths.insert(rule.lhs.degree());
            index.entry(rule.lhs.clone()).or_insert(i);
        }
        Self {
            rules,
            index,
            lengths,
        }
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Leftmost position and rule matching inside `word`
    fn find_match(&self, word: &Monomial) -> Option<(usize, &RewriteRule)> {
        for start in 0..word.degree() {
            for &len in &self.lengths {
                if len == 0 {
                    continue;
                }
                let Some(window) = word.window(start, len) else {
                    continue;
                };
                if let Some(&i) = self.index.get(&window) {
                    return Some((start, &self.rules[i]));
                }
            }
        }
        None
    }

    /// True when no rule applies to `word`
    pub fn is_normal(&self, word: &Monomial) -> bool {
        self.find_match(word).is_none()
    }

    pub fn reduce_monomial(&self, word: &Monomial) -> Polynomial {
        let mut pending = vec![(word.clone(), 1.0)];
        let mut out = Polynomial::zero();

        while let Some((current, coeff)) = pending.pop() {
            match self.find_match(&current) {
                Some((start, rule)) => {
                    let ops = current.operators();
                    let prefix = &ops[..start];
                    let suffix = &ops[start + rule.lhs.degree()..];
                    for (rm, rc) in rule.rhs.terms() {
                        let mut word = Vec::with_capacity(prefix.len() + rm.degree() + suffix.len());
                        word.extend_from_slice(prefix);
                        word.extend_from_slice(rm.operators());
                        word.extend_from_slice(suffix);
                        pending.push((Monomial::new(word), coeff * rc));
                    }
                }
                None => out.add_term(current, coeff),
            }
        }

        out
    }

    pub fn reduce(&self, poly: &Polynomial) -> Polynomial {
        let mut out = Polynomial::zero();
        for (m, c) in poly.terms() {
            for (rm, rc) in self.reduce_monomial(m).terms() {
                out.add_term(rm.clone(), c * rc);
            }
        }
        out
    }
}

impl From<Vec<RewriteRule>> for Substitutions {
    fn from(rules: Vec<RewriteRule>) -> Self {
        Self::new(rules)
    }
}

impl From<Substitutions> for Vec<RewriteRule> {
    fn from(subs: Substitutions) -> Self {
        subs.rules
    }
}

fn pair(a: Operator, b: Operator) -> Monomial {
    Monomial::new(vec![a, b])
}

/// Canonical commutation relations for `modes` bosonic modes
pub fn bosonic_substitutions(modes: usize) -> Substitutions {
    ordering_rules(modes, 1.0)
}

/// Canonical anticommutation relations for `modes` fermionic modes
pub fn fermionic_substitutions(modes: usize) -> Substitutions {
    let mut rules = ordering_rules(modes, -1.0).rules;
    for i in 0..modes {
        let (a, c) = (Operator::annihilator(i), Operator::creator(i));
        rules.push(RewriteRule::new(pair(a, a), Polynomial::zero()));
        rules.push(RewriteRule::new(pair(c, c), Polynomial::zero()));
    }
    Substitutions::new(rules)
}

/// Normal-ordering rules with exchange sign `sign` (+1 bosons, -1 fermions)
fn ordering_rules(modes: usize, sign: f64) -> Substitutions {
    let mut rules = Vec::new();
    for i in 0..modes {
        let (ai, ci) = (Operator::annihilator(i), Operator::creator(i));
        // a_i a_i' = 1 + sign * a_i' a_i
        rules.push(RewriteRule::new(
            pair(ai, ci),
            Polynomial::constant(1.0) + Polynomial::term(pair(ci, ai), sign),
        ));
        for j in 0..modes {
            let (aj, cj) = (Operator::annihilator(j), Operator::creator(j));
            if i != j {
                rules.push(RewriteRule::new(pair(ai, cj), Polynomial::term(pair(cj, ai), sign)));
            }
            if i > j {
                rules.push(RewriteRule::new(pair(ai, aj), Polynomial::term(pair(aj, ai), sign)));
                rules.push(RewriteRule::new(pair(ci, cj), Polynomial::term(pair(cj, ci), sign)));
            }
        }
    }
    Substitutions::new(rules)
}

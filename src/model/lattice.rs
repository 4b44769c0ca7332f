//! Structural lattice parameters
//!
//! Everything here is fixed once a model is constructed and feeds the
//! short fingerprint.

use crate::error::{SdpError, SdpResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Boundary condition of the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    #[default]
    Open,
    Periodic,
    Antiperiodic,
}

impl Boundary {
    /// Phase picked up by an operator wrapped around the lattice edge
    pub fn wrap_sign(&self) -> Option<f64> {
        match self {
            Self::Open => None,
            Self::Periodic => Some(1.0),
            Self::Antiperiodic => Some(-1.0),
        }
    }

    /// Numeric code used in fingerprints (`None` for open)
    pub fn code(&self) -> Option<i8> {
        match self {
            Self::Open => None,
            Self::Periodic => Some(1),
            Self::Antiperiodic => Some(-1),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Periodic => "periodic",
            Self::Antiperiodic => "antiperiodic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Boundary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" | "0" => Ok(Self::Open),
            "periodic" | "1" => Ok(Self::Periodic),
            "antiperiodic" | "-1" => Ok(Self::Antiperiodic),
            _ => Err(format!(
                "invalid boundary '{s}': expected open, periodic or antiperiodic"
            )),
        }
    }
}

/// Lattice shape, boundary condition and monomial window
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lattice {
    length: usize,
    width: usize,
    boundary: Boundary,
    window: usize,
}

impl Lattice {
    /// Create a lattice. A window of 0 spans the whole length.
    pub fn new(length: usize, width: usize, boundary: Boundary, window: usize) -> SdpResult<Self> {
        if length == 0 || width == 0 {
            return Err(SdpError::InvalidLattice(format!(
                "dimensions must be positive, got {}x{}",
                length, width
            )));
        }
        let window = if window == 0 { length } else { window };
        if window > length {
            return Err(SdpError::InvalidLattice(format!(
                "window {} exceeds lattice length {}",
                window, length
            )));
        }
        Ok(Self {
            length,
            width,
            boundary,
            window,
        })
    }

    /// Open one-dimensional chain
    pub fn chain(length: usize) -> SdpResult<Self> {
        Self::new(length, 1, Boundary::Open, 0)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of lattice sites
    pub fn sites(&self) -> usize {
        self.length * self.width
    }

    pub fn is_one_dimensional(&self) -> bool {
        self.width == 1
    }

    /// Whether the window is narrower than the lattice
    pub fn has_window(&self) -> bool {
        self.window != self.length
    }

    /// Start positions of every monomial window along the length
    pub fn window_starts(&self) -> Range<usize> {
        0..self.length - self.window + 1
    }

    /// Neighbours of `site` in the forward directions, with the phase of
    /// the bond (negative across an antiperiodic edge)
    ///
    /// Sites are numbered row by row, `width` sites per row. Each bond is
    /// reported once, from its lower-numbered end except across a wrap.
    pub fn forward_neighbors(&self, site: usize) -> Vec<(usize, f64)> {
        let (row, col) = (site / self.width, site % self.width);
        let wrap = self.boundary.wrap_sign();
        let mut neighbors = Vec::with_capacity(2);

        if col + 1 < self.width {
            neighbors.push((site + 1, 1.0));
        } else if let (Some(sign), true) = (wrap, self.width > 1) {
            neighbors.push((site + 1 - self.width, sign));
        }

        if row + 1 < self.length {
            neighbors.push((site + self.width, 1.0));
        } else if let Some(sign) = wrap {
            neighbors.push((site - (self.length - 1) * self.width, sign));
        }

        neighbors.retain(|(n, _)| *n != site);
        neighbors
    }

    /// Site `offset` steps along a 1D chain from `site`, with the wrap phase,
    /// or `None` past an open edge
    pub fn shifted(&self, site: usize, offset: usize) -> Option<(usize, f64)> {
        let target = site + offset;
        if target < self.length {
            return Some((target, 1.0));
        }
        let sign = self.boundary.wrap_sign()?;
        let wraps = target / self.length;
        let phase = if wraps % 2 == 1 { sign } else { 1.0 };
        Some((target % self.length, phase))
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} ({})", self.length, self.width, self.boundary)
    }
}

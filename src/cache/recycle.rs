//! Recycle-or-rebuild decision for the relaxation artifact

use crate::error::{SdpError, SdpResult};
use crate::relaxation::{ConstraintSet, Relaxation, SolverBackend};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// How the current relaxation came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Solved artifact taken from disk unchanged
    Loaded,
    /// Existing artifact adapted to the new constraints
    Recycled,
    /// Generated from scratch
    Rebuilt,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded => write!(f, "loaded"),
            Self::Recycled => write!(f, "recycled"),
            Self::Rebuilt => write!(f, "rebuilt"),
        }
    }
}

/// Pick the cheapest way to a relaxation for `constraints`
///
/// A solved `loaded` artifact is returned as is. Otherwise the loaded
/// artifact, or failing that the `outdated` one, is adapted in place. Only
/// [`SdpError::RecycleIncompatible`] falls through to `rebuild`; any other
/// error aborts.
pub fn recycle_or_rebuild<F>(
    loaded: Option<Relaxation>,
    outdated: Option<Relaxation>,
    constraints: &ConstraintSet,
    backend: &dyn SolverBackend,
    rebuild: F,
) -> SdpResult<(Relaxation, Outcome)>
where
    F: FnOnce() -> SdpResult<Relaxation>,
{
    let candidate = match loaded {
        Some(relaxation) if relaxation.is_solved() => {
            debug!("Using solved relaxation ({} moments)", relaxation.moments().len());
            return Ok((relaxation, Outcome::Loaded));
        }
        Some(relaxation) => Some(relaxation),
        None => outdated,
    };

    if let Some(mut relaxation) = candidate {
        debug!("Trying to recycle relaxation with {}", backend.name());
        match backend.adapt(&mut relaxation, constraints) {
            Ok(()) => {
                info!("Recycled relaxation ({})", constraints.shape());
                return Ok((relaxation, Outcome::Recycled));
            }
            Err(SdpError::RecycleIncompatible { reason }) => {
                info!("Cannot recycle relaxation: {}", reason);
            }
            Err(e) => return Err(e),
        }
    }

    let started = Instant::now();
    let relaxation = rebuild()?;
    info!("Rebuilt relaxation in {:.2?}", started.elapsed());
    Ok((relaxation, Outcome::Rebuilt))
}

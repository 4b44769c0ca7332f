//! Model factory for building strategies by name

use super::bose_hubbard::BoseHubbard;
use super::fermi_hubbard::FermiHubbard;
use super::kitaev::LongRangeKitaev;
use super::strategy::ModelStrategy;
use crate::error::SdpError;
use std::fmt;
use std::str::FromStr;

/// Available reference models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    BoseHubbard,
    FermiHubbard,
    LongRangeKitaev,
}

impl ModelKind {
    /// Get the model name used on the command line and in artifact headers
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::BoseHubbard => "bose-hubbard",
            ModelKind::FermiHubbard => "fermi-hubbard",
            ModelKind::LongRangeKitaev => "long-range-kitaev",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModelKind {
    type Err = SdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "bose-hubbard" | "bose" => Ok(ModelKind::BoseHubbard),
            "fermi-hubbard" | "fermi" => Ok(ModelKind::FermiHubbard),
            "long-range-kitaev" | "kitaev" => Ok(ModelKind::LongRangeKitaev),
            _ => Err(SdpError::UnknownModel(s.to_string())),
        }
    }
}

/// Create a strategy with default parameters
pub fn create_strategy(kind: ModelKind) -> Box<dyn ModelStrategy> {
    match kind {
        ModelKind::BoseHubbard => Box::new(BoseHubbard::default()),
        ModelKind::FermiHubbard => Box::new(FermiHubbard::default()),
        ModelKind::LongRangeKitaev => Box::new(LongRangeKitaev::default()),
    }
}

//! CLI argument definitions using clap derive

use crate::model::{Boundary, ConstraintKind};
use crate::relaxation::RelaxationLevel;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// sdpcache - Cached SDP relaxations of lattice models
///
/// Builds, stores and recycles moment relaxations of bosonic and
/// fermionic lattice Hamiltonians.
#[derive(Parser, Debug)]
#[command(name = "sdpcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SDPCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the short and full fingerprints of a model
    Fingerprint(ModelArgs),

    /// Build (or load) the relaxation and persist it
    Build(ModelArgs),

    /// Solve a model and print its observables
    Run(RunArgs),

    /// Inspect or clear stored relaxations
    Store(StoreArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Options describing one lattice model
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model: bose-hubbard, fermi-hubbard or long-range-kitaev
    #[arg(short, long, default_value = "bose-hubbard")]
    pub model: String,

    /// Number of sites along the chain
    #[arg(short = 'L', long, default_value_t = 2)]
    pub length: usize,

    /// Number of rows (1 for a chain)
    #[arg(short = 'W', long, default_value_t = 1)]
    pub width: usize,

    /// Boundary condition: open, periodic or antiperiodic
    #[arg(short, long, default_value = "open")]
    pub boundary: Boundary,

    /// Sites per monomial window (0 spans the lattice)
    #[arg(long, default_value_t = 0)]
    pub window: usize,

    /// Relaxation level, or "custom" for model-specific blocks
    #[arg(short, long, default_value = "custom")]
    pub level: RelaxationLevel,

    /// Physical parameter, e.g. --param U=4 --param mu=0.5
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, f64)>,

    /// Fix the total particle number
    #[arg(long)]
    pub n: Option<f64>,

    /// Lower bound on the total particle number
    #[arg(long)]
    pub nmin: Option<f64>,

    /// Upper bound on the total particle number
    #[arg(long)]
    pub nmax: Option<f64>,

    /// Upper bound on the occupation of every site
    #[arg(long)]
    pub local_nmax: Option<f64>,

    /// Artifact directory (overrides [store] output_dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl ModelArgs {
    /// Constraints given on the command line
    pub fn constraints(&self) -> Vec<(ConstraintKind, f64)> {
        [
            (ConstraintKind::N, self.n),
            (ConstraintKind::Nmin, self.nmin),
            (ConstraintKind::Nmax, self.nmax),
            (ConstraintKind::LocalNmax, self.local_nmax),
        ]
        .into_iter()
        .filter_map(|(kind, value)| value.map(|v| (kind, v)))
        .collect()
    }
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Write every observable of the model as CSV
    #[arg(short, long)]
    pub write: bool,

    /// Directory for CSV files (defaults to the artifact directory)
    #[arg(long, requires = "write")]
    pub data_dir: Option<PathBuf>,
}

/// Arguments for the store command
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Subcommand for store
    #[command(subcommand)]
    pub action: StoreAction,

    /// Artifact directory (overrides [store] output_dir)
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,
}

/// Store subcommands
#[derive(Subcommand, Debug)]
pub enum StoreAction {
    /// List stored relaxations, newest first
    List,

    /// Remove every stored relaxation
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Parse a physical parameter in NAME=VALUE format
fn parse_param(s: &str) -> Result<(String, f64), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid NAME=VALUE format: no '=' found in '{s}'"))?;
    let name = s[..pos].trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    let value = s[pos + 1..]
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.to_string(), value))
}

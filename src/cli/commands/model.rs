//! Model construction shared by the model commands

use crate::cache::ArtifactStore;
use crate::cli::args::ModelArgs;
use crate::config::Config;
use crate::error::SdpResult;
use crate::model::{create_strategy, Lattice, LatticeModel, ModelKind};
use crate::relaxation::MomentBackend;
use tracing::debug;

/// Build a configured model from command line options
///
/// The store is attached when an output directory is known; the solver
/// comes from the `[solver]` section.
pub(crate) fn from_args(args: &ModelArgs, config: &Config) -> SdpResult<LatticeModel> {
    let kind: ModelKind = args.model.parse()?;
    let lattice = Lattice::new(args.length, args.width, args.boundary, args.window)?;

    let backend = match config.external_solver() {
        Some(solver) => MomentBackend::with_solver(solver),
        None => MomentBackend::new(),
    };

    let mut model = LatticeModel::new(lattice, create_strategy(kind), Box::new(backend));
    if let Some(dir) = config.output_dir(args.output_dir.as_deref()) {
        debug!("Using artifact store {}", dir.display());
        model = model.with_store(ArtifactStore::new(dir));
    }

    model.set_level(args.level);
    for (name, value) in &args.params {
        model.set_parameter(name, *value)?;
    }
    for (kind, value) in args.constraints() {
        model.set_constraint(kind, value);
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use crate::error::SdpError;
    use clap::Parser;
    use tempfile::TempDir;

    fn model_args(argv: &[&str]) -> ModelArgs {
        let mut full = vec!["sdpcache", "fingerprint"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Fingerprint(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn applies_parameters_and_constraints() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let args = model_args(&[
            "--length", "4", "--boundary", "periodic", "--level", "1", "-p", "U=2", "--n", "2",
            "-o", dir,
        ]);

        let model = from_args(&args, &Config::default()).unwrap();
        let fingerprints = model.fingerprints();
        assert_eq!(fingerprints.short, "_lat=4x1_periodic=1_level=1");
        assert!(fingerprints.full.contains("_U=2"));
        assert!(fingerprints.full.contains("_n=2"));
        assert_eq!(model.store().unwrap().dir(), tmp.path());
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let args = model_args(&["-p", "Delta=1"]);
        let err = from_args(&args, &Config::default()).err().unwrap();
        assert!(matches!(err, SdpError::UnknownParameter { .. }));
    }

    #[test]
    fn unknown_model_is_rejected() {
        let args = model_args(&["--model", "ising"]);
        let err = from_args(&args, &Config::default()).err().unwrap();
        assert!(matches!(err, SdpError::UnknownModel(_)));
    }

    #[test]
    fn disabled_store_leaves_model_in_memory() {
        let mut config = Config::default();
        config.store.enabled = false;
        let model = from_args(&model_args(&[]), &config).unwrap();
        assert!(model.store().is_none());
    }
}

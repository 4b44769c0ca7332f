//! Fingerprint command - print the keys a configuration is stored under

use super::model;
use crate::cli::args::ModelArgs;
use crate::config::Config;
use crate::error::SdpResult;

/// Execute the fingerprint command
pub fn execute(args: ModelArgs, config: &Config) -> SdpResult<()> {
    let model = model::from_args(&args, config)?;
    let fingerprints = model.fingerprints();

    println!("short {}", fingerprints.short);
    println!("full  {}", fingerprints.full);

    if let Some(store) = model.store() {
        for fingerprint in [&fingerprints.full, &fingerprints.short] {
            let path = store.artifact_path(model.name(), fingerprint);
            if path.exists() {
                println!("stored {}", path.display());
            }
        }
    }
    Ok(())
}

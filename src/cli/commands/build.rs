//! Build command - generate or recycle a relaxation and persist it

use super::model;
use crate::cli::args::ModelArgs;
use crate::config::Config;
use crate::error::{SdpError, SdpResult};
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the build command
pub fn execute(args: ModelArgs, config: &Config) -> SdpResult<()> {
    let ctx = UiContext::detect();
    let mut model = model::from_args(&args, config)?;
    let store = model.store().cloned().ok_or(SdpError::StoreDisabled)?;
    let fingerprints = model.fingerprints();

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!(
        "Preparing {} relaxation on {}",
        model.name(),
        model.lattice()
    ));

    let (blocks, moments, solved) = match model.relaxation() {
        Ok(relaxation) => (
            relaxation.blocks().len(),
            relaxation.moments().len(),
            relaxation.is_solved(),
        ),
        Err(e) => {
            spinner.stop_error("Relaxation failed");
            return Err(e);
        }
    };

    let outcome = model
        .last_outcome()
        .map(|o| o.to_string())
        .unwrap_or_else(|| "cached".to_string());
    spinner.stop(&format!("Relaxation {}", outcome));

    let key = if solved {
        &fingerprints.full
    } else {
        &fingerprints.short
    };
    ui::key_value(&ctx, "level", &model.level().to_string());
    ui::key_value(&ctx, "blocks", &blocks.to_string());
    ui::key_value(&ctx, "moments", &moments.to_string());
    let path = store.artifact_path(model.name(), key);
    if path.exists() {
        ui::key_value(&ctx, "artifact", &path.display().to_string());
    } else {
        ui::step_warn_hint(
            &ctx,
            "Relaxation was not written",
            &format!("check that {} is writable", store.dir().display()),
        );
    }
    Ok(())
}

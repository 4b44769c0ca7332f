//! Run command - solve a model and report its observables

use super::model;
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::{SdpError, SdpResult};
use crate::observables;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the run command
pub fn execute(args: RunArgs, config: &Config) -> SdpResult<()> {
    let ctx = UiContext::detect();
    let mut model = model::from_args(&args.model, config)?;

    ui::header(&ctx, &format!("{} on {}", model.name(), model.lattice()));

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Solving relaxation...");
    if let Err(e) = model.solve() {
        spinner.stop_error("Solve failed");
        return Err(e);
    }
    spinner.stop("Relaxation solved");

    ui::key_value(&ctx, "primal", &format!("{:.8}", model.primal()?));
    ui::key_value(&ctx, "dual", &format!("{:.8}", model.dual()?));
    ui::key_value(&ctx, "gap", &format!("{:.3e}", model.gap()?));

    ui::section(&ctx, "Observables");
    for &observable in model.strategy().observables() {
        match observables::evaluate(&mut model, observable) {
            Ok(values) => ui::values_row(&ctx, observable.stem(), &values),
            Err(SdpError::Unsupported(what)) => {
                ui::step_warn_hint(&ctx, observable.stem(), &format!("unsupported: {}", what))
            }
            Err(e) => return Err(e),
        }
    }

    if args.write {
        let dir = args
            .data_dir
            .clone()
            .or_else(|| model.store().map(|s| s.dir().to_path_buf()))
            .ok_or(SdpError::StoreDisabled)?;

        let written = observables::write_data(&mut model, &dir)?;
        ui::step_ok_detail(
            &ctx,
            &format!("Wrote {} data files", written.len()),
            &dir.display().to_string(),
        );
    }
    Ok(())
}

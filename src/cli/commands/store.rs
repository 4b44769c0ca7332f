//! Store command - list or clear persisted relaxations

use crate::cache::{format_bytes, ArtifactStore, StoredEntry};
use crate::cli::args::{StoreAction, StoreArgs};
use crate::config::Config;
use crate::error::{SdpError, SdpResult};
use crate::relaxation::SolveStatus;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the store command
pub fn execute(args: StoreArgs, config: &Config) -> SdpResult<()> {
    let dir = config
        .output_dir(args.output_dir.as_deref())
        .ok_or(SdpError::StoreDisabled)?;
    let store = ArtifactStore::new(dir);

    match args.action {
        StoreAction::List => list(&store),
        StoreAction::Clear { yes } => clear(&store, yes),
    }
}

fn list(store: &ArtifactStore) -> SdpResult<()> {
    let ctx = UiContext::detect();
    let entries = store.list()?;

    if entries.is_empty() {
        ui::step_info(
            &ctx,
            &format!("No stored relaxations in {}", store.dir().display()),
        );
        return Ok(());
    }

    print_table(&entries);
    Ok(())
}

fn print_table(entries: &[StoredEntry]) {
    println!(
        "{:<18} {:<10} {:<10} {:<17} {}",
        style("MODEL").bold(),
        style("STATUS").bold(),
        style("SIZE").bold(),
        style("SAVED").bold(),
        style("FINGERPRINT").bold()
    );

    let mut total = 0;
    for entry in entries {
        let status = match entry.header.status {
            SolveStatus::Solved => style("solved").green(),
            SolveStatus::Unsolved => style("unsolved").yellow(),
        };
        println!(
            "{:<18} {:<10} {:<10} {:<17} {}",
            entry.header.model,
            status,
            format_bytes(entry.size_bytes),
            entry.header.saved_at.format("%Y-%m-%d %H:%M"),
            entry.header.fingerprint
        );
        total += entry.size_bytes;
    }

    println!();
    println!("{} relaxation(s), {}", entries.len(), format_bytes(total));
}

fn clear(store: &ArtifactStore, yes: bool) -> SdpResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let count = store.list()?.len();
    if count == 0 {
        ui::step_info(&ctx, "Nothing to remove");
        return Ok(());
    }

    let prompt = format!("Remove {} relaxation(s) from {}?", count, store.dir().display());
    if !ui::confirm(&ctx, &prompt, false)? {
        ui::step_warn_hint(&ctx, "Nothing removed", "Use --yes to skip confirmation");
        return Ok(());
    }

    let removed = store.clear()?;
    ui::step_ok(&ctx, &format!("Removed {} relaxation(s)", removed));
    Ok(())
}

//! The `volume prune` command: remove volumes no container references.

use tracing::debug;

use super::{Context, PruneOptions, format_report, run_single};
use crate::error::Result;

const WARNING: &str = "WARNING! This will remove all volumes not used by at least one container.
Are you sure you want to continue?";

pub fn run_prune(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<(u64, String)> {
    let filters = ctx.prune_filters(&options.filter, options.dry_run);

    if !ctx.confirm(options.force, options.dry_run, WARNING) {
        return Ok((0, String::new()));
    }

    let report = ctx.engine.volumes_prune(&filters)?;
    debug!(
        deleted = report.deleted.len(),
        space_reclaimed = report.space_reclaimed,
        "Pruned volumes"
    );

    let output = format_report("Volumes", options.dry_run, &report.deleted);
    Ok((report.space_reclaimed, output))
}

pub fn run(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<()> {
    run_single(ctx, options, WARNING, run_prune, true)
}

//! The `container prune` command: remove all stopped containers.

use tracing::debug;

use super::{Context, PruneOptions, format_report, run_single};
use crate::error::Result;

const WARNING: &str = "WARNING! This will remove all stopped containers.
Are you sure you want to continue?";

/// Prune stopped containers, returning the reclaimed bytes and report text.
pub fn run_prune(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<(u64, String)> {
    let filters = ctx.prune_filters(&options.filter, options.dry_run);

    if !ctx.confirm(options.force, options.dry_run, WARNING) {
        return Ok((0, String::new()));
    }

    let report = ctx.engine.containers_prune(&filters)?;
    debug!(
        deleted = report.deleted.len(),
        space_reclaimed = report.space_reclaimed,
        "Pruned containers"
    );

    let output = format_report("Containers", options.dry_run, &report.deleted);
    Ok((report.space_reclaimed, output))
}

pub fn run(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<()> {
    run_single(ctx, options, WARNING, run_prune, true)
}

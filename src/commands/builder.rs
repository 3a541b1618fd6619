//! The `builder prune` command: remove build cache.

use tracing::debug;

use super::{Context, PruneOptions, format_report, run_single};
use crate::error::Result;

const DANGLING_WARNING: &str = "WARNING! This will remove all dangling build cache.
Are you sure you want to continue?";

const ALL_WARNING: &str = "WARNING! This will remove all build cache.
Are you sure you want to continue?";

fn warning(all: bool) -> &'static str {
    if all { ALL_WARNING } else { DANGLING_WARNING }
}

pub fn run_prune(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<(u64, String)> {
    let mut filters = ctx.prune_filters(&options.filter, options.dry_run);
    if options.all {
        filters.add("all", "true");
    }

    if !ctx.confirm(options.force, options.dry_run, warning(options.all)) {
        return Ok((0, String::new()));
    }

    let report = ctx.engine.build_cache_prune(&filters)?;
    debug!(
        deleted = report.deleted.len(),
        space_reclaimed = report.space_reclaimed,
        "Pruned build cache"
    );

    let output = format_report("build cache objects", options.dry_run, &report.deleted);
    Ok((report.space_reclaimed, output))
}

pub fn run(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<()> {
    run_single(ctx, options, warning(options.all), run_prune, true)
}

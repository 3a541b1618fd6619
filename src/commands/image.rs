//! The `image prune` command: remove dangling images, or with `--all`
//! every image no container uses.

use tracing::debug;

use super::{Context, PruneOptions, format_report, run_single};
use crate::api::ImageDeleted;
use crate::error::Result;

const DANGLING_WARNING: &str = "WARNING! This will remove all dangling images.
Are you sure you want to continue?";

const ALL_IMAGES_WARNING: &str = "WARNING! This will remove all images without at least one container associated to them.
Are you sure you want to continue?";

fn warning(all: bool) -> &'static str {
    if all { ALL_IMAGES_WARNING } else { DANGLING_WARNING }
}

pub fn run_prune(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<(u64, String)> {
    let mut filters = ctx.prune_filters(&options.filter, options.dry_run);
    filters.add("dangling", (!options.all).to_string());

    if !ctx.confirm(options.force, options.dry_run, warning(options.all)) {
        return Ok((0, String::new()));
    }

    let report = ctx.engine.images_prune(&filters)?;
    debug!(
        deleted = report.deleted.len(),
        space_reclaimed = report.space_reclaimed,
        "Pruned images"
    );

    let lines = report.deleted.iter().map(|entry| match entry {
        ImageDeleted::Untagged(reference) => format!("untagged: {}", reference),
        ImageDeleted::Deleted(id) => format!("deleted: {}", id),
    });
    let output = format_report("Images", options.dry_run, lines);
    Ok((report.space_reclaimed, output))
}

pub fn run(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<()> {
    run_single(ctx, options, warning(options.all), run_prune, true)
}

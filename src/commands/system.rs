//! The `system prune` command: run every resource adapter in one pass
//! behind a single confirmation.

use tracing::{debug, info};

use super::{Context, PruneFn, PruneOptions, builder, container, image, network, volume};
use crate::api::BUILD_CACHE_PRUNE_MIN_VERSION;
use crate::error::Result;
use crate::filters::Filters;

#[derive(Debug, Clone, Default)]
pub struct SystemPruneOptions {
    pub force: bool,
    pub dry_run: bool,
    /// Remove all unused images, not just dangling ones
    pub all: bool,
    pub prune_volumes: bool,
    pub prune_build_cache: bool,
    pub filter: Filters,
}

impl SystemPruneOptions {
    /// Options as parsed from the command line; build cache is on by default.
    pub fn new(force: bool, dry_run: bool, all: bool, prune_volumes: bool, filter: Filters) -> Self {
        Self {
            force,
            dry_run,
            all,
            prune_volumes,
            prune_build_cache: true,
            filter,
        }
    }
}

/// One step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Containers,
    Networks,
    Volumes,
    Images,
    BuildCache,
}

impl Stage {
    fn adapter(self) -> PruneFn {
        match self {
            Stage::Containers => container::run_prune,
            Stage::Networks => network::run_prune,
            Stage::Volumes => volume::run_prune,
            Stage::Images => image::run_prune,
            Stage::BuildCache => builder::run_prune,
        }
    }
}

/// Stages to run for `options`. Containers go first so that volumes and
/// images they referenced are already unused when later stages run.
pub fn stages(options: &SystemPruneOptions) -> Vec<Stage> {
    let mut stages = vec![Stage::Containers, Stage::Networks];
    if options.prune_volumes {
        stages.push(Stage::Volumes);
    }
    stages.push(Stage::Images);
    if options.prune_build_cache {
        stages.push(Stage::BuildCache);
    }
    stages
}

/// Combined warning listing every category the run will touch.
pub fn confirmation_message(options: &SystemPruneOptions) -> String {
    let mut warnings = vec![
        "all stopped containers",
        "all networks not used by at least one container",
    ];
    if options.prune_volumes {
        warnings.push("all volumes not used by at least one container");
    }
    if options.all {
        warnings.push("all images without at least one container associated to them");
    } else {
        warnings.push("all dangling images");
    }
    if options.prune_build_cache {
        if options.all {
            warnings.push("all build cache");
        } else {
            warnings.push("all dangling build cache");
        }
    }

    let mut message = String::from("WARNING! This will remove:\n");
    for warning in warnings {
        message.push_str("        - ");
        message.push_str(warning);
        message.push('\n');
    }
    message.push_str("Are you sure you want to continue?");
    message
}

pub fn run(ctx: &mut Context<'_>, options: &SystemPruneOptions) -> Result<()> {
    let mut options = options.clone();
    if options.prune_build_cache {
        let version = ctx.engine.api_version()?;
        if version < BUILD_CACHE_PRUNE_MIN_VERSION {
            debug!(%version, "Daemon API too old for build cache pruning");
            options.prune_build_cache = false;
        }
    }

    if !ctx.confirm(options.force, options.dry_run, &confirmation_message(&options)) {
        return Ok(());
    }

    // Stages are already confirmed; each only forwards dry-run and filters.
    let stage_options = PruneOptions {
        force: true,
        dry_run: options.dry_run,
        all: options.all,
        filter: options.filter.clone(),
    };

    let mut space_reclaimed: u64 = 0;
    for stage in stages(&options) {
        debug!(?stage, "Running prune stage");
        let (reclaimed, output) = (stage.adapter())(ctx, &stage_options)?;
        space_reclaimed = space_reclaimed.saturating_add(reclaimed);
        ctx.print_report(&output)?;
    }

    info!(space_reclaimed, dry_run = options.dry_run, "System prune finished");
    ctx.print_space_reclaimed(options.dry_run, space_reclaimed)
}

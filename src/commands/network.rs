//! The `network prune` command: remove networks no container is attached to.

use tracing::debug;

use super::{Context, PruneOptions, format_report, run_single};
use crate::error::Result;

const WARNING: &str = "WARNING! This will remove all networks not used by at least one container.
Are you sure you want to continue?";

pub fn run_prune(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<(u64, String)> {
    let filters = ctx.prune_filters(&options.filter, options.dry_run);

    if !ctx.confirm(options.force, options.dry_run, WARNING) {
        return Ok((0, String::new()));
    }

    let report = ctx.engine.networks_prune(&filters)?;
    debug!(deleted = report.deleted.len(), "Pruned networks");

    let output = format_report("Networks", options.dry_run, &report.deleted);
    Ok((report.space_reclaimed, output))
}

/// Networks hold no disk space, so no total line is printed.
pub fn run(ctx: &mut Context<'_>, options: &PruneOptions) -> Result<()> {
    run_single(ctx, options, WARNING, run_prune, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{FakeEngine, Harness, simple_report};

    #[test]
    fn test_force_empty_prints_nothing() {
        let mut harness = Harness::new(FakeEngine::default());
        let options = PruneOptions {
            force: true,
            ..PruneOptions::default()
        };
        harness.run(|ctx| run(ctx, &options)).unwrap();
        assert_eq!(harness.output(), "");
        assert_eq!(harness.engine.kinds(), vec!["networks"]);
    }

    #[test]
    fn test_force_deleted_networks() {
        let mut harness = Harness::new(FakeEngine {
            networks: simple_report(),
            ..FakeEngine::default()
        });
        let options = PruneOptions {
            force: true,
            ..PruneOptions::default()
        };
        let (space, output) = harness.run(|ctx| run_prune(ctx, &options)).unwrap();
        assert_eq!(space, 2000);
        assert_eq!(output, "Deleted Networks:\nfoo\nbar\nbaz\n");
    }

    #[test]
    fn test_filters_forwarded() {
        let mut harness = Harness::new(FakeEngine::default());
        let mut options = PruneOptions {
            force: true,
            ..PruneOptions::default()
        };
        options.filter.add("until", "10m");
        harness.run(|ctx| run_prune(ctx, &options)).unwrap();
        let sent = harness.engine.filters_for("networks");
        assert!(sent.exact_match("until", "10m"));
        assert!(sent.exact_match("dryRun", "false"));
    }

    #[test]
    fn test_decline() {
        let mut harness = Harness::new(FakeEngine::default()).answering("no\n");
        harness
            .run(|ctx| run(ctx, &PruneOptions::default()))
            .unwrap();
        assert!(harness.engine.kinds().is_empty());
    }
}

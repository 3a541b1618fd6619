//! CLI command implementations.
//!
//! Each resource kind has its own module exposing `run_prune`, the adapter
//! returning `(bytes reclaimed, report text)`, and `run`, the command entry
//! that prints the report. `system` composes the adapters.

pub mod builder;
pub mod container;
pub mod image;
pub mod network;
pub mod system;
pub mod volume;

use std::io::Write;

use tracing::debug;

use crate::api::Engine;
use crate::error::Result;
use crate::filters::Filters;
use crate::prompt::{self, PromptInput};
use crate::units;

/// Collaborators shared by every prune command for one invocation.
pub struct Context<'a> {
    pub engine: &'a dyn Engine,
    pub input: &'a mut dyn PromptInput,
    pub out: &'a mut dyn Write,
    /// `name=value` filters from the config file
    pub default_filters: &'a [String],
}

/// Options of a single-resource prune.
#[derive(Debug, Clone, Default)]
pub struct PruneOptions {
    pub force: bool,
    pub dry_run: bool,
    /// Images and build cache only: prune everything unused, not just dangling
    pub all: bool,
    pub filter: Filters,
}

/// Signature shared by all per-resource adapters.
pub type PruneFn = fn(&mut Context<'_>, &PruneOptions) -> Result<(u64, String)>;

impl Context<'_> {
    /// Ask for confirmation unless the run is forced or a dry run.
    pub fn confirm(&mut self, force: bool, dry_run: bool, warning: &str) -> bool {
        if force || dry_run {
            return true;
        }
        let confirmed = prompt::confirm(warning, &mut *self.input, &mut *self.out);
        debug!(confirmed, "Confirmation answered");
        confirmed
    }

    /// Caller filters merged with config defaults, plus the `dryRun` marker.
    pub fn prune_filters(&self, filter: &Filters, dry_run: bool) -> Filters {
        filter
            .clone()
            .with_defaults(self.default_filters)
            .with_dry_run(dry_run)
    }

    /// Print a non-empty report followed by a blank line.
    pub fn print_report(&mut self, report: &str) -> Result<()> {
        if !report.is_empty() {
            writeln!(self.out, "{}", report)?;
        }
        Ok(())
    }

    pub fn print_space_reclaimed(&mut self, dry_run: bool, bytes: u64) -> Result<()> {
        writeln!(self.out, "{}", space_reclaimed_line(dry_run, bytes))?;
        Ok(())
    }
}

/// Render deleted identifiers under a "Deleted <noun>:" header.
/// Returns an empty string when nothing was deleted.
pub fn format_report<I, S>(noun: &str, dry_run: bool, ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = ids.into_iter().peekable();
    if lines.peek().is_none() {
        return String::new();
    }
    let mut output = if dry_run {
        format!("Will Delete {}:\n", noun)
    } else {
        format!("Deleted {}:\n", noun)
    };
    for id in lines {
        output.push_str(id.as_ref());
        output.push('\n');
    }
    output
}

pub fn space_reclaimed_line(dry_run: bool, bytes: u64) -> String {
    let label = if dry_run {
        "Estimated reclaimable space:"
    } else {
        "Total reclaimed space:"
    };
    format!("{} {}", label, units::human_size(bytes))
}

/// Run a single-resource adapter as a command: confirm with `warning`,
/// print the report and, when `print_total` is set, the reclaimed space line.
/// A declined confirmation prints nothing further.
pub fn run_single(
    ctx: &mut Context<'_>,
    options: &PruneOptions,
    warning: &str,
    adapter: PruneFn,
    print_total: bool,
) -> Result<()> {
    if !ctx.confirm(options.force, options.dry_run, warning) {
        return Ok(());
    }
    let confirmed = PruneOptions {
        force: true,
        ..options.clone()
    };
    let (space_reclaimed, report) = adapter(ctx, &confirmed)?;
    ctx.print_report(&report)?;
    if print_total {
        ctx.print_space_reclaimed(options.dry_run, space_reclaimed)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeEngine, Harness};
    use super::*;

    #[test]
    fn test_format_report_empty() {
        assert_eq!(format_report("Volumes", false, Vec::<String>::new()), "");
    }

    #[test]
    fn test_format_report_lists_ids() {
        assert_eq!(
            format_report("Volumes", false, ["foo", "bar"]),
            "Deleted Volumes:\nfoo\nbar\n"
        );
    }

    #[test]
    fn test_format_report_dry_run_header() {
        assert_eq!(
            format_report("Networks", true, ["n1"]),
            "Will Delete Networks:\nn1\n"
        );
    }

    #[test]
    fn test_space_reclaimed_line() {
        assert_eq!(space_reclaimed_line(false, 2000), "Total reclaimed space: 2kB");
        assert_eq!(
            space_reclaimed_line(true, 0),
            "Estimated reclaimable space: 0B"
        );
    }

    #[test]
    fn test_confirm_skipped_when_forced_or_dry_run() {
        let mut harness = Harness::new(FakeEngine::default()).answering("n\n");
        assert!(harness.run(|ctx| ctx.confirm(true, false, "Sure?")));
        assert!(harness.run(|ctx| ctx.confirm(false, true, "Sure?")));
        assert_eq!(harness.input.reads, 0);
        assert_eq!(harness.output(), "");
    }

    #[test]
    fn test_confirm_prompts_otherwise() {
        let mut harness = Harness::new(FakeEngine::default()).answering("y\n");
        assert!(harness.run(|ctx| ctx.confirm(false, false, "Sure?")));
        assert_eq!(harness.input.reads, 1);
        assert_eq!(harness.output(), "Sure? [y/N] ");
    }

    #[test]
    fn test_prune_filters_merge_defaults_and_mark_dry_run() {
        let mut harness = Harness::new(FakeEngine::default());
        harness.default_filters = vec!["until=24h".to_string()];
        let mut filter = Filters::new();
        filter.add("label", "tmp");

        let merged = harness.run(|ctx| ctx.prune_filters(&filter, true));
        assert!(merged.exact_match("label", "tmp"));
        assert!(merged.exact_match("until", "24h"));
        assert!(merged.exact_match("dryRun", "true"));
    }
}

use clap::{
    Args, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

mod api;
mod commands;
mod config;
mod error;
mod exit;
mod filters;
mod prompt;
mod units;

use commands::PruneOptions;
use commands::system::SystemPruneOptions;
use filters::{FilterArg, Filters};

#[derive(Parser)]
#[command(name = "reclaim", styles = STYLES)]
#[command(about = "Reclaim disk space by pruning unused daemon resources")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Daemon to connect to (unix://, tcp://, http:// or https://)
    #[arg(short = 'H', long, global = true, value_name = "URL")]
    host: Option<String>,

    /// Enable verbose output (debug-level logging)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Use a specific config file (ignores default config locations)
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    config_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage containers
    Container {
        #[command(subcommand)]
        command: ContainerCommands,
    },
    /// Manage volumes
    Volume {
        #[command(subcommand)]
        command: VolumeCommands,
    },
    /// Manage networks
    Network {
        #[command(subcommand)]
        command: NetworkCommands,
    },
    /// Manage images
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Manage build cache
    Builder {
        #[command(subcommand)]
        command: BuilderCommands,
    },
    /// Manage the daemon as a whole
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand)]
enum ContainerCommands {
    /// Remove all stopped containers
    Prune(PruneArgs),
}

#[derive(Subcommand)]
enum VolumeCommands {
    /// Remove all unused volumes
    Prune(PruneArgs),
}

#[derive(Subcommand)]
enum NetworkCommands {
    /// Remove all unused networks
    Prune(PruneArgs),
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Remove unused images
    Prune {
        #[command(flatten)]
        prune: PruneArgs,
        /// Remove all unused images, not just dangling ones
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum BuilderCommands {
    /// Remove build cache
    Prune {
        #[command(flatten)]
        prune: PruneArgs,
        /// Remove all unused build cache, not just dangling ones
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum SystemCommands {
    /// Remove unused data
    ///
    /// Removes stopped containers, unused networks, dangling images and build
    /// cache. Volumes are only pruned with --volumes.
    Prune {
        #[command(flatten)]
        prune: PruneArgs,
        /// Remove all unused images, not just dangling ones
        #[arg(short, long)]
        all: bool,
        /// Prune volumes
        #[arg(long)]
        volumes: bool,
    },
}

/// Flags shared by every prune command.
#[derive(Args)]
struct PruneArgs {
    /// Do not prompt for confirmation
    #[arg(short, long)]
    force: bool,

    /// Display the prune report without removing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Provide filter values (e.g. 'label=<key>=<value>', 'until=<timestamp>')
    #[arg(long, value_name = "FILTER", value_parser = parse_filter)]
    filter: Vec<FilterArg>,
}

impl PruneArgs {
    fn into_options(self, all: bool) -> PruneOptions {
        PruneOptions {
            force: self.force,
            dry_run: self.dry_run,
            all,
            filter: self.filter.into_iter().collect(),
        }
    }
}

fn parse_filter(s: &str) -> Result<FilterArg, String> {
    s.parse().map_err(|e: error::ReclaimError| e.to_string())
}

fn main() {
    let cli = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&cli).expect("clap argument parsing invariant");

    // Initialize tracing with appropriate filter level
    // RUST_LOG env var takes precedence, otherwise use --verbose flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    let Some(command) = cli.command else {
        // Print help when no command is provided
        Cli::command()
            .print_help()
            .expect("failed to write help to stdout");
        println!();
        return;
    };

    if let Err(e) = execute(command, cli.host, cli.config_file.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(exit::code_for(&e));
    }
}

fn execute(
    command: Commands,
    host: Option<String>,
    config_file: Option<&std::path::Path>,
) -> error::Result<()> {
    let mut config = match config_file {
        Some(path) => config::Config::load_file(path)?,
        None => config::Config::load()?,
    };
    if host.is_some() {
        config.host = host;
    }

    let engine = api::http::HttpEngine::new(config.host(), config.api_version()?, config.timeout())?;
    let mut input = prompt::StdinInput;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut ctx = commands::Context {
        engine: &engine,
        input: &mut input,
        out: &mut out,
        default_filters: &config.prune_filters,
    };

    match command {
        Commands::Container {
            command: ContainerCommands::Prune(args),
        } => commands::container::run(&mut ctx, &args.into_options(false)),
        Commands::Volume {
            command: VolumeCommands::Prune(args),
        } => commands::volume::run(&mut ctx, &args.into_options(false)),
        Commands::Network {
            command: NetworkCommands::Prune(args),
        } => commands::network::run(&mut ctx, &args.into_options(false)),
        Commands::Image {
            command: ImageCommands::Prune { prune, all },
        } => commands::image::run(&mut ctx, &prune.into_options(all)),
        Commands::Builder {
            command: BuilderCommands::Prune { prune, all },
        } => commands::builder::run(&mut ctx, &prune.into_options(all)),
        Commands::System {
            command: SystemCommands::Prune {
                prune,
                all,
                volumes,
            },
        } => {
            let filter: Filters = prune.filter.into_iter().collect();
            let options =
                SystemPruneOptions::new(prune.force, prune.dry_run, all, volumes, filter);
            commands::system::run(&mut ctx, &options)
        }
    }
}

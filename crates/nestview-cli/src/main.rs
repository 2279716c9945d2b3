#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nestview_core::config::{EffectiveConfig, resolve_config};
use nestview_core::{ErrorCode, timing};
use output::{CliError, OutputMode, WithCode, render_error};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "nv: context views over compound graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit a stage timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Project config file (defaults to ./nestview.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Build a context view around nodes",
        long_about = "Expand the given nodes to their neighborhood and ancestors, collapse \
                      everything outside the focus, and reduce redundant edges.",
        after_help = "EXAMPLES:\n    # Two hops of prerequisites, no dependents\n    nv context book.json thm2 --pred 2 --succ 0\n\n    # Build from a record set and keep every edge\n    nv context --records notes.json ch2 --no-reduce\n\n    # Emit machine-readable output\n    nv context book.json thm2 --json"
    )]
    Context(cmd::context::ContextArgs),

    #[command(
        about = "Remove transitively implied edges",
        after_help = "EXAMPLES:\n    nv reduce book.json --format text"
    )]
    Reduce(cmd::reduce::ReduceArgs),

    #[command(
        about = "Show the node hierarchy",
        after_help = "EXAMPLES:\n    # Whole forest\n    nv tree book.json\n\n    # One chapter\n    nv tree book.json ch1"
    )]
    Tree(cmd::tree::TreeArgs),

    #[command(
        about = "Step to the next or previous node in reading order",
        after_help = "EXAMPLES:\n    nv nav book.json thm1 --next\n    nv nav book.json thm1 --prev --key name"
    )]
    Nav(cmd::nav::NavArgs),

    #[command(about = "Summarize graph size and shape")]
    Stats(cmd::stats::StatsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("NESTVIEW_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "nestview=debug,nv=debug,info"
        } else {
            "nestview=info,nv=info,warn"
        })
    });

    let format = env::var("NESTVIEW_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EffectiveConfig> {
    let cwd = env::current_dir()?;
    resolve_config(
        cli.config.as_deref(),
        &cwd,
        output::flag_output_name(cli.format, cli.json),
    )
    .with_code(ErrorCode::ConfigParseError)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let output = OutputMode::from_name(&config.resolved_output).unwrap_or(OutputMode::Text);
    debug!(?output, "resolved output mode");

    match &cli.command {
        Commands::Context(args) => timing::timed("cmd.context", || {
            cmd::context::run_context(args, config.project.context, output)
        }),
        Commands::Reduce(args) => {
            timing::timed("cmd.reduce", || cmd::reduce::run_reduce(args, output))
        }
        Commands::Tree(args) => timing::timed("cmd.tree", || cmd::tree::run_tree(args, output)),
        Commands::Nav(args) => timing::timed("cmd.nav", || {
            cmd::nav::run_nav(args, &config.project.navigation.sort_key, output)
        }),
        Commands::Stats(args) => {
            timing::timed("cmd.stats", || cmd::stats::run_stats(args, output))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let timing_enabled = cli.timing || timing::timing_enabled_from_env();
    timing::set_timing_enabled(timing_enabled);
    timing::clear_timings();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let result = run(&cli);

    if timing_enabled {
        let report = timing::collect_report();
        if report.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else {
            eprintln!("timing report:");
            eprintln!("{}", report.display_table());
            eprintln!("timing report (json):");
            eprintln!("{}", report.to_json());
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mode = output::resolve_output_mode(cli.format, cli.json);
            if render_error(mode, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["nv", "--timing", "stats", "g.json"]);
        assert!(cli.timing);
        assert!(matches!(cli.command, Commands::Stats(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["nv", "tree", "g.json", "--json", "--timing", "-v"]);
        assert!(cli.json);
        assert!(cli.timing);
        assert!(cli.verbose);
    }

    #[test]
    fn format_flag_accepts_modes() {
        let cli = Cli::parse_from(["nv", "--format", "text", "reduce", "g.json"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(Cli::try_parse_from(["nv", "--format", "yaml", "reduce", "g.json"]).is_err());
    }

    #[test]
    fn json_alias_becomes_format_name() {
        let cli = Cli::parse_from(["nv", "stats", "g.json", "--json"]);
        assert_eq!(output::flag_output_name(cli.format, cli.json), Some("json"));
    }

    #[test]
    fn config_path_is_global() {
        let cli = Cli::parse_from(["nv", "nav", "g.json", "a", "--next", "--config", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn records_flag_belongs_to_input() {
        let cli = Cli::parse_from(["nv", "context", "--records", "r.json", "a", "b"]);
        match cli.command {
            Commands::Context(args) => {
                assert!(args.input.records);
                assert_eq!(args.input.file, PathBuf::from("r.json"));
                assert_eq!(args.ids, vec!["a", "b"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn all_subcommands_listed() {
        use clap::CommandFactory;
        let names: Vec<String> = Cli::command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["context", "reduce", "tree", "nav", "stats"]);
    }
}

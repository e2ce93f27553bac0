#![forbid(unsafe_code)]

mod cmd;
mod load;
mod output;

use archlens_core::config::load_user_config;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::Globals;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "archlens: structural graph engine for codebase exploration",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to pretty on a TTY, text when piped).
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Enrich the graph with classes, functions and calls found under DIR.
    #[arg(long, value_name = "DIR", global = true)]
    enrich: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Build, measure and assess a codebase",
        long_about = "Build the graph from a fact bundle, then report build counts, metrics and dependency quality.",
        after_help = "EXAMPLES:\n    # Full analysis\n    archlens analyze facts.json\n\n    # Include code-level detail from the source tree\n    archlens analyze facts.json --enrich ./src\n\n    # Emit machine-readable output\n    archlens analyze facts.json --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Centrality, hubs and communities",
        long_about = "Compute importance (PageRank), bottlenecks (betweenness), hubs (degree) and communities (Louvain).",
        after_help = "EXAMPLES:\n    # Show metrics\n    archlens metrics facts.yaml\n\n    # Emit machine-readable output\n    archlens metrics facts.yaml --json"
    )]
    Metrics(cmd::metrics::MetricsArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Dependency quality report",
        long_about = "Report cycles, coupling, cohesion, complexity and recommendations.",
        after_help = "EXAMPLES:\n    # Show the report\n    archlens report facts.json\n\n    # Emit machine-readable output\n    archlens report facts.json --format json"
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "List dependency cycles",
        long_about = "Enumerate simple dependency cycles with per-cycle and aggregate severity.",
        after_help = "EXAMPLES:\n    # List cycles\n    archlens cycles facts.json"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Exploration",
        about = "Ask a question in plain English",
        long_about = "Classify a free-text question and answer it with the matching tool.",
        after_help = "EXAMPLES:\n    # Dependencies of a component\n    archlens query facts.json \"What does UserService depend on?\"\n\n    # Callers\n    archlens query facts.json who calls UserRepository\n\n    # Emit machine-readable output\n    archlens query facts.json \"Are there circular dependencies?\" --json"
    )]
    Query(cmd::query::QueryArgs),

    #[command(
        next_help_heading = "Exploration",
        about = "Run one agent tool",
        long_about = "Run a single agent tool: deps, callers, structure, patterns, path, info, impact, critical, communities, summary or list.",
        after_help = "EXAMPLES:\n    # List the tools\n    archlens tool list\n\n    # Impact of a change, three levels deep\n    archlens tool impact facts.json Database --depth 3\n\n    # Path between two components\n    archlens tool path facts.json Controller Database --json"
    )]
    Tool(cmd::tool::ToolArgs),

    #[command(
        next_help_heading = "Exploration",
        about = "Export the graph as JSON",
        long_about = "Write every node with its attributes and every edge with its relation tag.",
        after_help = "EXAMPLES:\n    # Export to stdout\n    archlens export facts.json\n\n    # Export to a file\n    archlens export facts.json --output graph.json"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    archlens completions bash\n\n    # Generate zsh completions\n    archlens completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ARCHLENS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "archlens=debug,info"
        } else {
            "archlens=info,warn"
        })
    });

    let format = env::var("ARCHLENS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr so stdout stays parseable.
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

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user_config = load_user_config().unwrap_or_else(|err| {
        warn!(%err, "ignoring unreadable user config");
        archlens_core::config::UserConfig::default()
    });
    let output = resolve_output_mode(cli.format, cli.json, user_config.output.as_deref());
    debug!(?output, "resolved output mode");

    let globals = Globals {
        output,
        enrich: cli.enrich.clone(),
        project_root: env::current_dir()?,
    };

    let command_result = match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, &globals),
        Commands::Metrics(args) => cmd::metrics::run_metrics(args, &globals),
        Commands::Report(args) => cmd::report::run_report(args, &globals),
        Commands::Cycles(args) => cmd::cycles::run_cycles(args, &globals),
        Commands::Query(args) => cmd::query::run_query(args, &globals),
        Commands::Tool(args) => cmd::tool::run_tool(args, &globals),
        Commands::Export(args) => cmd::export::run_export(args, &globals),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    if let Err(err) = command_result {
        render_error(output, &CliError::from_anyhow(&err))?;
        std::process::exit(1);
    }
    Ok(())
}

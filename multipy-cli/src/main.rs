//! multipy CLI - provision side-by-side CPython runtimes.

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};

use commands::choices::ChoicesArgs;
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::init::InitArgs;
use commands::provision::ProvisionArgs;
use commands::relink::RootArgs;
use commands::tools::ToolsArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "multipy")]
#[command(version, about = "Install python.org runtimes side by side", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Remove all installed runtimes and provision the configured ones
    Provision(ProvisionArgs),

    /// Download an installer package into the cache
    Fetch(FetchArgs),

    /// Show the choice document used to install a package silently
    Choices(ChoicesArgs),

    /// Rebuild the MAJOR.MINOR aliases of variant installations
    Relink(RootArgs),

    /// List installed version directories and aliases
    List(RootArgs),

    /// Install the companion developer tools
    Tools(ToolsArgs),

    /// Create the configuration file
    Init(InitArgs),

    /// Inspect the configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let _logging_guard = match multipy::logging::init_logging(
        &multipy::logging::default_log_dir(),
        multipy::logging::default_log_file(),
    ) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };

    if let Err(e) = run(cli.command) {
        tracing::error!(error = %e, "command failed");
        e.exit();
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Provision(args) => commands::provision::run(args),
        Commands::Fetch(args) => commands::fetch::run(args),
        Commands::Choices(args) => commands::choices::run(args),
        Commands::Relink(args) => commands::relink::run(args),
        Commands::List(args) => commands::relink::run_list(args),
        Commands::Tools(args) => commands::tools::run(args),
        Commands::Init(args) => commands::init::run(args),
        Commands::Config(command) => commands::config::run(command),
    }
}

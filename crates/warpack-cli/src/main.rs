//! Warpack CLI - assemble exploded web applications

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod error;
mod exit_codes;
mod util;

#[derive(Parser)]
#[command(name = "warpack")]
#[command(author = "Warpack Contributors")]
#[command(version)]
#[command(about = "Assemble exploded web applications", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the webapp directory of a project
    Package {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Configuration file (default: <path>/warpack.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory (overrides webappDirectory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Set a filter property (key=value)
        #[arg(short = 'D', long = "define")]
        define: Vec<String>,

        /// List packaged files
        #[arg(long)]
        list: bool,
    },

    /// Show the packaging sequence without running it
    Plan {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Configuration file (default: <path>/warpack.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Package {
            path,
            config,
            output,
            define,
            list,
        } => commands::package::run(&path, config.as_deref(), output.as_deref(), &define, list),

        Commands::Plan { path, config } => commands::plan::run(&path, config.as_deref()),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

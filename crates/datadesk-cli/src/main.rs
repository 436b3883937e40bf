use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "datadesk", version, about = "DataDesk admin console")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web console.
    Serve {
        /// Path to the configuration file.
        #[arg(long, default_value = "datadesk.yaml")]
        config: PathBuf,
    },

    /// Write a starter configuration file.
    Init {
        /// Output path for the configuration file.
        #[arg(default_value = "datadesk.yaml")]
        path: PathBuf,

        /// Overwrite if the file already exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve { config } => commands::serve::serve(config).await,
        Command::Init { path, force } => commands::init::init(path, force),
    }
}

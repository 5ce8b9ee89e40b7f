mod config;
mod error;

use clap::Parser;
use config::{Cli, Commands, InspectConfig};

mod cmd;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = InspectConfig::load(cli.config.as_deref()).and_then(|config| {
        let mut out = std::io::stdout().lock();
        match cli.command {
            Commands::Info(args) => cmd::info::run(&args, &config, &mut out),
            Commands::Topics(args) => cmd::topics::run(&args, &config, &mut out),
            Commands::Dump(args) => cmd::dump::run(&args, &config, &mut out),
        }
    });
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

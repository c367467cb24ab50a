use std::process::ExitCode;

use bcn_cli::cli::{Cli, Commands};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn run(command: &Commands) -> anyhow::Result<bool> {
    match command {
        Commands::Export { model, out } => {
            info!("Exporting {} to {}", model.display(), out.display());
            commands::export::handle(model, out)?;
        }
        Commands::Decode { report, out } => {
            info!("Decoding {}", report.report.display());
            commands::decode::handle(report, out)?;
        }
        Commands::Validate { report, config } => {
            info!("Validating {}", report.report.display());
            return commands::validate::handle(report, config.as_deref());
        }
        Commands::Breakpoints {
            function,
            count,
            m,
            infrastructures,
        } => commands::breakpoints::handle(*function, *count, *m, *infrastructures)?,
    }
    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }

    match run(&cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("Solution has violations");
            ExitCode::from(1)
        }
        Err(e) => {
            error!("Command failed: {:?}", e);
            ExitCode::from(2)
        }
    }
}

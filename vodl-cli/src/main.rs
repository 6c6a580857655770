mod cli;
mod commands;
mod config;
mod error;
mod output;
mod prompt;
mod time;

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::{CommandExecutor, PlanRequest},
    config::AppConfig,
    error::Result,
};
use clap::Parser;
use colored::*;
use std::io::IsTerminal;
use std::path::Path;
use std::process;
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let output_format = args.command.output_format();

    if let Err(e) = run(args).await {
        match output_format {
            Some(OutputFormat::Json) => {
                let error_json = serde_json::json!({
                    "status": "error",
                    "message": e.to_string(),
                });
                println!("{error_json}");
            }
            _ => {
                error!("Application error: {}", e);
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet);

    let config_path = args.config.as_deref();

    match args.command {
        Commands::Renditions { master, output } => {
            executor(config_path)?
                .list_renditions(&master, output)
                .await?;
        }

        Commands::Plan {
            master,
            media,
            quality,
            start,
            end,
            base_url,
            output_dir,
            target,
            output,
            no_prompt,
        } => {
            executor(config_path)?
                .plan(PlanRequest {
                    master,
                    media,
                    quality,
                    start,
                    end,
                    base_url,
                    output_dir,
                    target,
                    output,
                    no_prompt,
                })
                .await?;
        }

        // no config is loaded up front, so `--reset` can replace a broken file
        Commands::Config { show, reset } => config_command(config_path, show, reset)?,
    }

    Ok(())
}

fn executor(config_path: Option<&Path>) -> Result<CommandExecutor> {
    let config = AppConfig::load(config_path)?;
    Ok(CommandExecutor::new(config, std::io::stdout().is_terminal()))
}

fn config_command(path: Option<&Path>, show: bool, reset: bool) -> Result<()> {
    if reset {
        let path = AppConfig::reset(path)?;
        println!("✓ Configuration reset to defaults in {}", path.display());
    } else if show {
        let config = AppConfig::load(path)?;
        println!("{}", config.show()?);
    } else {
        println!("Use --show to display current configuration or --reset to reset to defaults");
    }
    Ok(())
}

/// Logs go to stderr so they never mix with JSON printed on stdout.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(verbose)
                .with_writer(std::io::stderr),
        )
        .init();
}

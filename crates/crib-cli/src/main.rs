use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crib_cli::commands::{borrow, due, employee, holding, logs, returns, status, tool};
use crib_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Log to stderr so command output on stdout stays pipeable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Commands::Tool(action) => tool::run(&mut out, action, &config)?,
        Commands::Employee(action) => employee::run(&mut out, action, &config)?,
        Commands::Borrow(args) => borrow::run(&mut out, args, &config)?,
        Commands::Return(args) => returns::run(&mut out, args, &config)?,
        Commands::Holding(args) => holding::run(&mut out, args, &config)?,
        Commands::Logs(args) => logs::run(&mut out, args, &config)?,
        Commands::Due(args) => due::run(&mut out, args, &config)?,
        Commands::Status(args) => status::run(&mut out, args, &config)?,
    }

    Ok(())
}

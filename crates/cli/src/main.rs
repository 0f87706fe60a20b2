// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fx - component runtime CLI

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, status, wtf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "fx",
    version,
    about = "fx - wire components to services and configurations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate an assembly
    Check(check::CheckArgs),
    /// Install an assembly and show the state of every component
    Status(status::StatusArgs),
    /// Install an assembly and explain why components are not registered
    Wtf(wtf::WtfArgs),
}

fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Check(args) => check::handle(args),
        Commands::Status(args) => status::handle(args),
        Commands::Wtf(args) => wtf::handle(args),
    }
}

/// Log to stderr, filtered by `FX_LOG` (default `warn`)
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("FX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

//! `SceneGltf` CLI - Command-line interface for the glTF exporter
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "scenegltf")]
#[command(version = crate::VERSION)]
#[command(about = "SceneGltf: compile scene descriptions to glTF 2.0", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the `SceneGltf` CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}

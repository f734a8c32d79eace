//! Subcommands
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::path::PathBuf;

use clap::Subcommand;

pub mod export;
pub mod inspect;

#[derive(Subcommand)]
pub enum Commands {
    /// Export a JSON scene description to .glb or .gltf
    Export {
        /// Scene description file (JSON)
        #[arg(short, long)]
        scene: PathBuf,

        /// Output file; the extension picks the format (.glb or .gltf)
        #[arg(short, long)]
        output: PathBuf,

        /// Export settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Yield to the progress display after this many milliseconds of work
        #[arg(long)]
        budget_ms: Option<u64>,

        /// Embed the buffer as a data URI (.gltf only)
        #[arg(long)]
        embed: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print a summary of a .glb or .gltf file
    Inspect {
        /// File to inspect
        file: PathBuf,

        /// Also list nodes and materials
        #[arg(short, long)]
        detailed: bool,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Export {
                scene,
                output,
                config,
                budget_ms,
                embed,
                quiet,
            } => export::execute(scene, output, config.as_deref(), *budget_ms, *embed, *quiet),
            Commands::Inspect { file, detailed } => inspect::execute(file, *detailed),
        }
    }
}

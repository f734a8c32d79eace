//! CLI command for exporting a scene description
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::path::Path;
use std::time::{Duration, Instant};

use crate::cancel::CancellationToken;
use crate::cli::progress::{
    CUBE, DISK, LOOKING_GLASS, print_done, print_step, print_warning, step_spinner,
};
use crate::export::{GltfExporter, SceneProgress};
use crate::host::description::SceneDescription;
use crate::schedule::TimeBudgetAgent;
use crate::settings::{BufferLocation, ExportFormat, ExportSettings};

pub fn execute(
    scene: &Path,
    output: &Path,
    config: Option<&Path>,
    budget_ms: Option<u64>,
    embed: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut settings = match config {
        Some(path) => ExportSettings::from_toml_file(path)?,
        None => ExportSettings::default(),
    };
    settings = settings.with_format(ExportFormat::from_path(output));
    if embed {
        if settings.format != ExportFormat::Json {
            anyhow::bail!("--embed only applies to .gltf output");
        }
        settings = settings.with_buffer_location(BufferLocation::DataUri);
    }

    if !quiet {
        print_step(1, 3, LOOKING_GLASS, &format!("Reading {}...", scene.display()));
    }
    let host = SceneDescription::load_scene(scene)?;

    let mut exporter = GltfExporter::new(&host, settings)?;
    if let Some(ms) = budget_ms {
        exporter = exporter.with_defer_agent(TimeBudgetAgent::new(Duration::from_millis(ms)));
    }

    let pb = (!quiet).then(|| step_spinner("[2/3]", "Walking scene..."));
    let mut progress = exporter.add_scene(host.roots().to_vec(), "Scene")?;
    let report = loop {
        match progress {
            SceneProgress::Complete(report) => break report,
            SceneProgress::Suspended => {
                if let Some(pb) = &pb {
                    pb.set_message(format!("{} nodes", exporter.emitted_nodes()));
                    pb.tick();
                }
                progress = exporter.resume()?;
            }
        }
    };
    if let Some(pb) = pb {
        pb.finish_and_clear();
        print_step(2, 3, CUBE, &format!("Walked scene: {} root nodes", report.root_nodes.len()));
    }

    if !quiet {
        print_step(3, 3, DISK, &format!("Writing {}...", output.display()));
    }
    let summary = exporter.save_to_file(output, &CancellationToken::new())?;

    if !quiet {
        for entry in exporter.log().warnings() {
            print_warning(&format!("[{}] {}", entry.code, entry.message));
        }
        println!(
            "  {} nodes, {} meshes, {} materials, {} textures, {} bytes",
            summary.nodes, summary.meshes, summary.materials, summary.textures, summary.bytes_written
        );
        for file in &summary.files {
            println!("  {}", file.display());
        }
        print_done(start.elapsed());
    }
    if !report.all_succeeded {
        tracing::warn!("some nodes were dropped; see warnings above");
    }

    Ok(())
}

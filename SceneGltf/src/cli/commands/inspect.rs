//! CLI command for inspecting exported documents
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::path::Path;

use crate::container::read_glb_info;
use crate::import::{ImportedAlphaMode, import_slice};

pub fn execute(file: &Path, detailed: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)?;

    println!("{}", file.display());
    if bytes.starts_with(b"glTF") {
        let info = read_glb_info(&bytes)?;
        println!(
            "  GLB v{}: {} bytes (JSON {}, BIN {})",
            info.version,
            info.total_len,
            info.json_len,
            info.bin_len.map_or_else(|| "none".to_string(), |len| len.to_string())
        );
    }

    // External .bin buffers are not needed for a structural summary.
    let scene = import_slice(&bytes)?;
    if let Some(generator) = &scene.generator {
        println!("  Generator: {generator}");
    }
    println!(
        "  {} scenes, {} nodes, {} meshes ({} primitives), {} materials",
        scene.scenes.len(),
        scene.nodes.len(),
        scene.mesh_primitives.len(),
        scene.mesh_primitives.iter().sum::<usize>(),
        scene.materials.len()
    );
    println!(
        "  {} textures, {} images, {} cameras, {} lights",
        scene.texture_count, scene.image_count, scene.camera_count, scene.light_count
    );
    if !scene.extensions_used.is_empty() {
        println!("  Extensions: {}", scene.extensions_used.join(", "));
    }
    let environments = scene.environment_requests();
    if !environments.is_empty() {
        println!("  Skybox materials: {}", environments.len());
    }

    if detailed {
        println!("\nNodes:");
        for (index, node) in scene.nodes.iter().enumerate() {
            let mut parts = Vec::new();
            if let Some(mesh) = node.mesh {
                parts.push(format!("mesh {mesh}"));
            }
            if let Some(camera) = node.camera {
                parts.push(format!("camera {camera}"));
            }
            if let Some(light) = node.light {
                parts.push(format!("light {light}"));
            }
            if !node.children.is_empty() {
                parts.push(format!("{} children", node.children.len()));
            }
            println!(
                "  [{index:>4}] {:<32} {}",
                node.name.as_deref().unwrap_or("<unnamed>"),
                parts.join(", ")
            );
        }

        println!("\nMaterials:");
        for (index, material) in scene.materials.iter().enumerate() {
            let alpha = match material.alpha_mode {
                ImportedAlphaMode::Opaque => "OPAQUE".to_string(),
                ImportedAlphaMode::Mask => {
                    format!("MASK {}", material.alpha_cutoff.unwrap_or(0.5))
                }
                ImportedAlphaMode::Blend => "BLEND".to_string(),
            };
            println!(
                "  [{index:>4}] {:<32} {alpha}{}{}",
                material.name.as_deref().unwrap_or("<unnamed>"),
                if material.unlit { ", unlit" } else { "" },
                if material.double_sided { ", double-sided" } else { "" }
            );
        }
    }

    Ok(())
}

//! # `SceneGltf`
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! A scene graph to glTF 2.0 compiler.
//!
//! The exporter walks a host scene through the [`host::SceneProvider`] trait
//! and writes a self-contained `.glb` or a `.gltf` with its buffer.
//!
//! - **Deduplication** - meshes, materials and textures shared by `Arc` are written once
//! - **Buffer packing** - all vertex, index and image data in one 4-byte aligned buffer
//! - **Material conversion** - PBR, specular-glossiness, unlit, transmission and
//!   engine-specific shaders carried as extras
//! - **Time slicing** - scene walks yield to the host between nodes
//! - **Atomic output** - nothing appears at the destination unless the save completes
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use scenegltf::prelude::*;
//!
//! let mesh = Arc::new(MeshData {
//!     positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//!     submeshes: vec![SubMesh::triangles(vec![0, 1, 2])],
//!     ..MeshData::default()
//! });
//! let mut scene = MemoryScene::new();
//! scene.add_root(MemoryNode::new("triangle").with_renderable(Renderable::new(mesh, vec![None])));
//!
//! let mut exporter = GltfExporter::new(&scene, ExportSettings::default())?;
//! exporter.add_scene_blocking(scene.roots().to_vec(), "Scene")?;
//! exporter.save_to_file("triangle.glb", &CancellationToken::new())?;
//! # Ok::<(), scenegltf::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `scenegltf` command-line binary

pub mod buffer;
pub mod cancel;
pub mod container;
pub mod document;
pub mod environment;
pub mod error;
pub mod export;
pub mod host;
pub mod import;
pub mod log;
pub mod material;
pub mod registry;
pub mod schedule;
pub mod settings;
pub mod texture;
pub mod walker;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::cancel::CancellationToken;
    pub use crate::error::{Error, Result};
    pub use crate::export::{ExportSummary, GltfExporter, SceneProgress, SceneReport};
    pub use crate::host::{
        CameraData, LightData, LightKind, MemoryNode, MemoryScene, MeshData, NodeContent,
        NodeFlags, NodeHandle, Projection, Renderable, SceneProvider, ShadingConfig, SubMesh,
        TextureAsset, TextureSlot, Topology, Transform,
    };
    pub use crate::log::{ExportLog, LogCode, LogLevel};
    pub use crate::schedule::{DeferAgent, TimeBudgetAgent, UninterruptedAgent};
    pub use crate::settings::{BufferLocation, ExportFormat, ExportSettings};

    pub use crate::environment::{EnvironmentHost, EnvironmentUpdateQueue, SkyboxDescriptor};
    pub use crate::import::{ImportedScene, import_file, import_slice};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;

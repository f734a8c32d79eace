//! Read-back of exported documents.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Parses `.glb`/`.gltf` output with the `gltf` crate into a flat summary:
//! node hierarchy, material properties and extras. Used for inspection and
//! to recover skybox markers as environment requests.

use std::path::Path;

use serde_json::Value;

use crate::environment::{EnvironmentRequest, EnvironmentUpdateQueue, SkyboxDescriptor};
use crate::error::Result;

/// Alpha mode as read from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportedAlphaMode {
    Opaque,
    Mask,
    Blend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedNode {
    pub name: Option<String>,
    pub translation: [f32; 3],
    /// Quaternion, xyzw.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub light: Option<usize>,
    pub extras: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMaterial {
    pub name: Option<String>,
    pub alpha_mode: ImportedAlphaMode,
    /// The explicit `alphaCutoff`, if the document carries one.
    pub alpha_cutoff: Option<f32>,
    pub unlit: bool,
    pub double_sided: bool,
    pub base_color: [f32; 4],
    pub has_base_color_texture: bool,
    pub extras: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedScene {
    pub generator: Option<String>,
    pub nodes: Vec<ImportedNode>,
    /// Root node indices of each scene.
    pub scenes: Vec<Vec<usize>>,
    pub materials: Vec<ImportedMaterial>,
    /// Primitive count per mesh.
    pub mesh_primitives: Vec<usize>,
    pub texture_count: usize,
    pub image_count: usize,
    pub camera_count: usize,
    pub light_count: usize,
    pub extensions_used: Vec<String>,
}

fn parse_extras(raw: &gltf::json::Extras) -> Option<Value> {
    let raw = raw.as_ref()?;
    match serde_json::from_str(raw.get()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("ignoring unparsable extras: {e}");
            None
        }
    }
}

impl ImportedScene {
    fn from_gltf(gltf: &gltf::Gltf) -> Self {
        let nodes = gltf
            .nodes()
            .map(|node| {
                let (translation, rotation, scale) = node.transform().decomposed();
                ImportedNode {
                    name: node.name().map(String::from),
                    translation,
                    rotation,
                    scale,
                    children: node.children().map(|child| child.index()).collect(),
                    mesh: node.mesh().map(|mesh| mesh.index()),
                    camera: node.camera().map(|camera| camera.index()),
                    light: node.light().map(|light| light.index()),
                    extras: parse_extras(node.extras()),
                }
            })
            .collect();

        let materials = gltf
            .materials()
            .map(|material| {
                let pbr = material.pbr_metallic_roughness();
                ImportedMaterial {
                    name: material.name().map(String::from),
                    alpha_mode: match material.alpha_mode() {
                        gltf::material::AlphaMode::Opaque => ImportedAlphaMode::Opaque,
                        gltf::material::AlphaMode::Mask => ImportedAlphaMode::Mask,
                        gltf::material::AlphaMode::Blend => ImportedAlphaMode::Blend,
                    },
                    alpha_cutoff: material.alpha_cutoff(),
                    unlit: material.unlit(),
                    double_sided: material.double_sided(),
                    base_color: pbr.base_color_factor(),
                    has_base_color_texture: pbr.base_color_texture().is_some(),
                    extras: parse_extras(material.extras()),
                }
            })
            .collect();

        Self {
            generator: gltf.as_json().asset.generator.clone(),
            nodes,
            scenes: gltf
                .scenes()
                .map(|scene| scene.nodes().map(|node| node.index()).collect())
                .collect(),
            materials,
            mesh_primitives: gltf.meshes().map(|mesh| mesh.primitives().count()).collect(),
            texture_count: gltf.textures().count(),
            image_count: gltf.images().count(),
            camera_count: gltf.cameras().count(),
            light_count: gltf.lights().map_or(0, Iterator::count),
            extensions_used: gltf.extensions_used().map(String::from).collect(),
        }
    }

    /// Skybox markers found in material extras, in material order.
    #[must_use]
    pub fn environment_requests(&self) -> Vec<EnvironmentRequest> {
        self.materials
            .iter()
            .enumerate()
            .filter_map(|(index, material)| {
                let skybox = SkyboxDescriptor::from_extras(material.extras.as_ref()?)?;
                Some(EnvironmentRequest {
                    material: index as u32,
                    material_name: material.name.clone(),
                    skybox,
                })
            })
            .collect()
    }

    /// Queue every skybox marker. Returns how many were queued.
    pub fn queue_environment_updates(&self, queue: &mut EnvironmentUpdateQueue) -> usize {
        let requests = self.environment_requests();
        let count = requests.len();
        for request in requests {
            queue.request_environment_update(request);
        }
        count
    }
}

/// Parse a GLB or glTF JSON document from memory.
pub fn import_slice(bytes: &[u8]) -> Result<ImportedScene> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    Ok(ImportedScene::from_gltf(&gltf))
}

/// Parse a `.glb` or `.gltf` file. External buffers are not loaded.
pub fn import_file(path: impl AsRef<Path>) -> Result<ImportedScene> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading document");
    let gltf = gltf::Gltf::open(path)?;
    Ok(ImportedScene::from_gltf(&gltf))
}

//! glTF 2.0 document model.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod extensions;
mod materials;
mod types;
mod validate;

use serde::Serialize;

use crate::error::{Error, Result};

pub use materials::{
    GltfAlphaMode, GltfImage, GltfMaterial, GltfNormalTextureInfo, GltfOcclusionTextureInfo,
    GltfPbrMetallicRoughness, GltfSampler, GltfTexture, GltfTextureInfo,
};
pub use types::{
    DocumentExtensions, GltfAccessor, GltfAsset, GltfBuffer, GltfBufferView, GltfCamera,
    GltfMesh, GltfNode, GltfOrthographic, GltfPerspective, GltfPrimitive, GltfScene,
    LightsPunctual,
};

pub const COMPONENT_UNSIGNED_SHORT: u32 = 5123;
pub const COMPONENT_UNSIGNED_INT: u32 = 5125;
pub const COMPONENT_FLOAT: u32 = 5126;

pub const TARGET_ARRAY_BUFFER: u32 = 34962;
pub const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Complete glTF document
#[derive(Debug, Clone, Serialize)]
pub struct GltfDocument {
    pub asset: GltfAsset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<GltfScene>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<GltfNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<GltfMesh>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<GltfMaterial>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<GltfTexture>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<GltfImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<GltfSampler>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<GltfCamera>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<GltfAccessor>,
    #[serde(rename = "bufferViews")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<GltfBufferView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<GltfBuffer>,
    #[serde(skip_serializing_if = "DocumentExtensions::is_empty")]
    pub extensions: DocumentExtensions,
    #[serde(rename = "extensionsUsed")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions_used: Vec<String>,
    #[serde(rename = "extensionsRequired")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions_required: Vec<String>,
}

impl GltfDocument {
    /// Empty document with only asset metadata.
    #[must_use]
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            asset: GltfAsset {
                version: "2.0".to_string(),
                generator: Some(generator.into()),
            },
            scene: None,
            scenes: Vec::new(),
            nodes: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            images: Vec::new(),
            samplers: Vec::new(),
            cameras: Vec::new(),
            accessors: Vec::new(),
            buffer_views: Vec::new(),
            buffers: Vec::new(),
            extensions: DocumentExtensions::default(),
            extensions_used: Vec::new(),
            extensions_required: Vec::new(),
        }
    }

    /// Number of punctual lights declared at the root.
    #[must_use]
    pub fn light_count(&self) -> usize {
        self.extensions
            .lights_punctual
            .as_ref()
            .map_or(0, |l| l.lights.len())
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>> {
        let result = if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        };
        result.map_err(|e| Error::GltfSerializationFailed {
            message: e.to_string(),
        })
    }
}

//! glTF 2.0 material and texture types.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::Value;

use super::extensions::{MaterialExtensions, TextureInfoExtensions};

/// Image embedded in the binary buffer
#[derive(Debug, Clone, Serialize)]
pub struct GltfImage {
    #[serde(rename = "bufferView")]
    pub buffer_view: u32,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Texture sampler defining filtering and wrapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GltfSampler {
    #[serde(rename = "magFilter")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<u32>,
    #[serde(rename = "minFilter")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<u32>,
    #[serde(rename = "wrapS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_s: Option<u32>,
    #[serde(rename = "wrapT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_t: Option<u32>,
}

impl Default for GltfSampler {
    fn default() -> Self {
        Self {
            mag_filter: Some(9729), // LINEAR
            min_filter: Some(9987), // LINEAR_MIPMAP_LINEAR
            wrap_s: Some(10497),    // REPEAT
            wrap_t: Some(10497),    // REPEAT
        }
    }
}

/// Texture referencing an image and sampler
#[derive(Debug, Clone, Serialize)]
pub struct GltfTexture {
    pub source: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Texture info used in materials
#[derive(Debug, Clone, Serialize)]
pub struct GltfTextureInfo {
    pub index: u32,
    #[serde(rename = "texCoord")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tex_coord: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<TextureInfoExtensions>,
}

/// Normal texture info with scale
#[derive(Debug, Clone, Serialize)]
pub struct GltfNormalTextureInfo {
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(rename = "texCoord")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tex_coord: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<TextureInfoExtensions>,
}

/// Occlusion texture info with strength
#[derive(Debug, Clone, Serialize)]
pub struct GltfOcclusionTextureInfo {
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
    #[serde(rename = "texCoord")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tex_coord: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<TextureInfoExtensions>,
}

/// PBR Metallic-Roughness material model
#[derive(Debug, Clone, Default, Serialize)]
pub struct GltfPbrMetallicRoughness {
    #[serde(rename = "baseColorFactor")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_factor: Option<[f32; 4]>,
    #[serde(rename = "baseColorTexture")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<GltfTextureInfo>,
    #[serde(rename = "metallicFactor")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metallic_factor: Option<f32>,
    #[serde(rename = "roughnessFactor")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roughness_factor: Option<f32>,
    #[serde(rename = "metallicRoughnessTexture")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<GltfTextureInfo>,
}

/// `alphaMode` values. Premultiplied blending has no glTF value of its own
/// and is written as `BLEND` with a marker in material extras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GltfAlphaMode {
    Opaque,
    Mask,
    Blend,
}

/// Material definition
#[derive(Debug, Clone, Default, Serialize)]
pub struct GltfMaterial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "pbrMetallicRoughness")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pbr_metallic_roughness: Option<GltfPbrMetallicRoughness>,
    #[serde(rename = "normalTexture")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<GltfNormalTextureInfo>,
    #[serde(rename = "occlusionTexture")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occlusion_texture: Option<GltfOcclusionTextureInfo>,
    #[serde(rename = "emissiveTexture")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<GltfTextureInfo>,
    #[serde(rename = "emissiveFactor")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive_factor: Option<[f32; 3]>,
    #[serde(rename = "alphaMode")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_mode: Option<GltfAlphaMode>,
    #[serde(rename = "alphaCutoff")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_cutoff: Option<f32>,
    #[serde(rename = "doubleSided")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_sided: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<MaterialExtensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Value>,
}

impl GltfMaterial {
    /// Texture indices referenced anywhere in the material, extensions included.
    pub fn texture_indices(&self) -> Vec<u32> {
        let mut out = Vec::new();
        if let Some(pbr) = &self.pbr_metallic_roughness {
            out.extend(pbr.base_color_texture.as_ref().map(|t| t.index));
            out.extend(pbr.metallic_roughness_texture.as_ref().map(|t| t.index));
        }
        out.extend(self.normal_texture.as_ref().map(|t| t.index));
        out.extend(self.occlusion_texture.as_ref().map(|t| t.index));
        out.extend(self.emissive_texture.as_ref().map(|t| t.index));
        if let Some(ext) = &self.extensions {
            if let Some(sg) = &ext.pbr_specular_glossiness {
                out.extend(sg.diffuse_texture.as_ref().map(|t| t.index));
                out.extend(sg.specular_glossiness_texture.as_ref().map(|t| t.index));
            }
            if let Some(tr) = &ext.transmission {
                out.extend(tr.transmission_texture.as_ref().map(|t| t.index));
            }
        }
        out
    }
}

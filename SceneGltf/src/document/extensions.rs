//! Khronos extension payloads.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::Serialize;

use super::materials::GltfTextureInfo;

pub const KHR_MATERIALS_PBR_SPECULAR_GLOSSINESS: &str = "KHR_materials_pbrSpecularGlossiness";
pub const KHR_MATERIALS_UNLIT: &str = "KHR_materials_unlit";
pub const KHR_MATERIALS_TRANSMISSION: &str = "KHR_materials_transmission";
pub const KHR_TEXTURE_TRANSFORM: &str = "KHR_texture_transform";
pub const KHR_LIGHTS_PUNCTUAL: &str = "KHR_lights_punctual";

#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterialExtensions {
    #[serde(
        rename = "KHR_materials_pbrSpecularGlossiness",
        skip_serializing_if = "Option::is_none"
    )]
    pub pbr_specular_glossiness: Option<PbrSpecularGlossiness>,
    #[serde(rename = "KHR_materials_unlit", skip_serializing_if = "Option::is_none")]
    pub unlit: Option<MaterialsUnlit>,
    #[serde(rename = "KHR_materials_transmission", skip_serializing_if = "Option::is_none")]
    pub transmission: Option<MaterialsTransmission>,
}

impl MaterialExtensions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pbr_specular_glossiness.is_none() && self.unlit.is_none() && self.transmission.is_none()
    }

    /// Extension names present, for `extensionsUsed`.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.pbr_specular_glossiness.is_some() {
            names.push(KHR_MATERIALS_PBR_SPECULAR_GLOSSINESS);
        }
        if self.unlit.is_some() {
            names.push(KHR_MATERIALS_UNLIT);
        }
        if self.transmission.is_some() {
            names.push(KHR_MATERIALS_TRANSMISSION);
        }
        names
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PbrSpecularGlossiness {
    #[serde(rename = "diffuseFactor")]
    pub diffuse_factor: [f32; 4],
    #[serde(rename = "specularFactor")]
    pub specular_factor: [f32; 3],
    #[serde(rename = "glossinessFactor")]
    pub glossiness_factor: f32,
    #[serde(rename = "diffuseTexture", skip_serializing_if = "Option::is_none")]
    pub diffuse_texture: Option<GltfTextureInfo>,
    #[serde(
        rename = "specularGlossinessTexture",
        skip_serializing_if = "Option::is_none"
    )]
    pub specular_glossiness_texture: Option<GltfTextureInfo>,
}

/// Empty marker object.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MaterialsUnlit {}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialsTransmission {
    #[serde(rename = "transmissionFactor")]
    pub transmission_factor: f32,
    #[serde(rename = "transmissionTexture", skip_serializing_if = "Option::is_none")]
    pub transmission_texture: Option<GltfTextureInfo>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextureInfoExtensions {
    #[serde(rename = "KHR_texture_transform", skip_serializing_if = "Option::is_none")]
    pub texture_transform: Option<TextureTransform>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextureTransform {
    pub offset: [f32; 2],
    pub rotation: f32,
    pub scale: [f32; 2],
    #[serde(rename = "texCoord", skip_serializing_if = "Option::is_none")]
    pub tex_coord: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeExtensions {
    #[serde(rename = "KHR_lights_punctual")]
    pub lights_punctual: NodeLight,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NodeLight {
    pub light: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GltfSpot {
    #[serde(rename = "innerConeAngle")]
    pub inner_cone_angle: f32,
    #[serde(rename = "outerConeAngle")]
    pub outer_cone_angle: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GltfLight {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub light_type: String,
    pub color: [f32; 3],
    pub intensity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot: Option<GltfSpot>,
}

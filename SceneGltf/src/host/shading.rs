//! Typed shading configuration supplied by the host.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde::Serialize;

/// Encoded image container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Png,
    Jpeg,
}

impl ImageMime {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Guess from a file extension (case-insensitive).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Texture pixel source.
#[derive(Debug, Clone)]
pub enum TextureSource {
    /// Already encoded PNG/JPEG bytes, embedded as-is.
    Encoded { bytes: Vec<u8>, mime: ImageMime },
    /// Raw RGBA8 pixels, encoded by the session's `ImageEncoder`.
    Rgba8 {
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Point,
    #[default]
    Bilinear,
    Trilinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    Clamp,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerSettings {
    pub filter: FilterMode,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
}

/// A host texture. Identity (the `Arc` pointer) is what gets deduplicated.
#[derive(Debug, Clone)]
pub struct TextureAsset {
    pub name: Option<String>,
    pub source: TextureSource,
    /// Whether the alpha channel carries meaningful data.
    pub has_alpha: bool,
    pub sampler: SamplerSettings,
}

impl TextureAsset {
    #[must_use]
    pub fn encoded(name: impl Into<String>, bytes: Vec<u8>, mime: ImageMime) -> Self {
        Self {
            name: Some(name.into()),
            source: TextureSource::Encoded { bytes, mime },
            has_alpha: false,
            sampler: SamplerSettings::default(),
        }
    }

    #[must_use]
    pub fn rgba8(name: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            name: Some(name.into()),
            source: TextureSource::Rgba8 {
                width,
                height,
                pixels,
            },
            has_alpha: true,
            sampler: SamplerSettings::default(),
        }
    }
}

/// UV offset/scale/rotation (`KHR_texture_transform`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvTransform {
    pub offset: [f32; 2],
    pub scale: [f32; 2],
    /// Radians, counter-clockwise.
    pub rotation: f32,
}

impl UvTransform {
    pub const IDENTITY: Self = Self {
        offset: [0.0, 0.0],
        scale: [1.0, 1.0],
        rotation: 0.0,
    };

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for UvTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Texture reference from a material, with its own UV channel and transform.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    pub texture: Arc<TextureAsset>,
    pub uv_channel: u32,
    pub transform: UvTransform,
}

impl TextureSlot {
    #[must_use]
    pub fn new(texture: Arc<TextureAsset>) -> Self {
        Self {
            texture,
            uv_channel: 0,
            transform: UvTransform::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: UvTransform) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SpecularGlossiness {
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 3],
    pub glossiness: f32,
    pub diffuse_texture: Option<TextureSlot>,
    pub specular_glossiness_texture: Option<TextureSlot>,
}

impl Default for SpecularGlossiness {
    fn default() -> Self {
        Self {
            diffuse_color: [1.0, 1.0, 1.0, 1.0],
            specular_color: [1.0, 1.0, 1.0],
            glossiness: 1.0,
            diffuse_texture: None,
            specular_glossiness_texture: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticleBlendMode {
    #[default]
    Alpha,
    Premultiply,
    Additive,
    Multiply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticleColorMode {
    #[default]
    Multiply,
    Additive,
    Subtractive,
    Overlay,
    Color,
    Difference,
}

/// Parameter set of the unlit particle shader family, carried verbatim in extras.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleParams {
    pub color: [f32; 4],
    pub cutoff: f32,
    pub blend_mode: ParticleBlendMode,
    pub color_mode: ParticleColorMode,
    pub flipbook_blending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distortion_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distortion_blend: Option<f32>,
    /// Near/far soft-particle fade distances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_particles_fade: Option<[f32; 2]>,
    /// Near/far camera fade distances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_fade: Option<[f32; 2]>,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            cutoff: 0.5,
            blend_mode: ParticleBlendMode::Alpha,
            color_mode: ParticleColorMode::Multiply,
            flipbook_blending: false,
            distortion_strength: None,
            distortion_blend: None,
            soft_particles_fade: None,
            camera_fade: None,
        }
    }
}

/// Environment/skybox shading.
#[derive(Debug, Clone)]
pub enum SkyboxParams {
    /// Six faces in +X, -X, +Y, -Y, +Z, -Z order.
    SixSided {
        faces: Vec<Arc<TextureAsset>>,
        tint: [f32; 4],
        exposure: f32,
        rotation: f32,
    },
    Equirectangular {
        texture: Arc<TextureAsset>,
        tint: [f32; 4],
        exposure: f32,
        rotation: f32,
    },
    Procedural {
        sun_size: f32,
        atmosphere_thickness: f32,
        sky_tint: [f32; 4],
        ground_color: [f32; 4],
        exposure: f32,
    },
}

/// Shader families that are not expressible as standard glTF and travel as extras.
/// Being one enum, at most one marker is active per material.
#[derive(Debug, Clone)]
pub enum SpecialShader {
    ParticlesUnlit(ParticleParams),
    Skybox(SkyboxParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlphaSettings {
    /// Alpha test threshold; `Some` requests mask mode.
    pub mask_threshold: Option<f32>,
    /// Alpha blending requested.
    pub translucent: bool,
}

#[derive(Debug, Clone)]
pub struct Transmission {
    pub factor: f32,
    pub texture: Option<TextureSlot>,
}

/// Host material description.
#[derive(Debug, Clone)]
pub struct ShadingConfig {
    pub name: Option<String>,
    /// Linear RGBA.
    pub base_color: [f32; 4],
    pub base_color_texture: Option<TextureSlot>,
    pub metallic: f32,
    pub roughness: f32,
    pub metallic_roughness_texture: Option<TextureSlot>,
    pub normal_texture: Option<TextureSlot>,
    pub normal_scale: f32,
    pub occlusion_texture: Option<TextureSlot>,
    pub occlusion_strength: f32,
    pub emissive_color: [f32; 3],
    pub emissive_texture: Option<TextureSlot>,
    pub specular_glossiness: Option<SpecularGlossiness>,
    pub special: Option<SpecialShader>,
    /// The shader has no lighting response.
    pub unlit: bool,
    pub alpha: AlphaSettings,
    pub transmission: Option<Transmission>,
    pub double_sided: bool,
}

impl ShadingConfig {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic: 0.0,
            roughness: 0.5,
            metallic_roughness_texture: None,
            normal_texture: None,
            normal_scale: 1.0,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            emissive_color: [0.0, 0.0, 0.0],
            emissive_texture: None,
            specular_glossiness: None,
            special: None,
            unlit: false,
            alpha: AlphaSettings::default(),
            transmission: None,
            double_sided: false,
        }
    }
}

//! Shading configuration → glTF material conversion.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Conversion runs in two steps. [`convert`] picks the material model and
//! resolves alpha and transmission into a [`ConvertedMaterial`] that still
//! refers to host textures. [`emit`](emit::emit_material) registers those
//! textures and produces the document entry.

mod defaults;
mod emit;

use crate::host::{
    ParticleBlendMode, ParticleParams, ShadingConfig, SkyboxParams, SpecialShader,
    SpecularGlossiness, TextureSlot, Transmission,
};
use crate::log::{ExportLog, LogCode};
use crate::registry::ArcKey;
use crate::settings::ExportSettings;

pub use defaults::default_material;
pub(crate) use emit::{EmitContext, emit_material};

/// glTF default alpha cutoff.
pub const DEFAULT_ALPHA_CUTOFF: f32 = 0.5;
const CUTOFF_EPSILON: f32 = 1e-5;

/// Registry key for materials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    Config(ArcKey<ShadingConfig>),
    /// Generated default material, one per point-cloud flag.
    Default { point_cloud: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
    /// Blend with color already multiplied by alpha.
    PremultipliedBlend,
}

/// Derived facts about a shading configuration, computed once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadingFlags {
    pub specular_glossiness: bool,
    pub particles: bool,
    pub skybox: bool,
    pub unlit: bool,
    pub mask: bool,
    pub blend: bool,
    pub transmission: bool,
    /// Transmission has to be folded into base alpha.
    pub transmission_fold: bool,
    pub base_texture_alpha: bool,
}

impl ShadingFlags {
    #[must_use]
    pub fn derive(config: &ShadingConfig, settings: &ExportSettings) -> Self {
        let transmission = config
            .transmission
            .as_ref()
            .is_some_and(|t| t.factor > 0.0 || t.texture.is_some());
        let transmission_fold = !settings.transmission_extension
            && config
                .transmission
                .as_ref()
                .is_some_and(|t| t.factor > 0.0 && t.texture.is_none());
        Self {
            specular_glossiness: config.specular_glossiness.is_some(),
            particles: matches!(config.special, Some(SpecialShader::ParticlesUnlit(_))),
            skybox: matches!(config.special, Some(SpecialShader::Skybox(_))),
            unlit: config.unlit,
            mask: config.alpha.mask_threshold.is_some(),
            blend: config.alpha.translucent,
            transmission,
            transmission_fold,
            base_texture_alpha: config
                .base_color_texture
                .as_ref()
                .is_some_and(|slot| slot.texture.has_alpha),
        }
    }
}

/// Metallic-roughness parameters.
#[derive(Debug, Clone)]
pub struct PbrParams {
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
}

/// Material model chosen for a shading configuration.
#[derive(Debug, Clone)]
pub enum MaterialVariant {
    MetallicRoughness(PbrParams),
    SpecularGlossiness(SpecularGlossiness),
    Unlit {
        base_color: [f32; 4],
        base_color_texture: Option<TextureSlot>,
    },
}

impl MaterialVariant {
    fn base_alpha_mut(&mut self) -> &mut f32 {
        match self {
            Self::MetallicRoughness(pbr) => &mut pbr.base_color[3],
            Self::SpecularGlossiness(sg) => &mut sg.diffuse_color[3],
            Self::Unlit { base_color, .. } => &mut base_color[3],
        }
    }
}

/// Opaque shader payloads written to material extras.
#[derive(Debug, Clone)]
pub enum MaterialExtras {
    Particles(ParticleParams),
    Skybox(SkyboxParams),
}

#[derive(Debug, Clone)]
pub struct ConvertedMaterial {
    pub name: Option<String>,
    pub variant: MaterialVariant,
    pub alpha_mode: AlphaMode,
    /// Present only for `Mask` with a non-default cutoff.
    pub alpha_cutoff: Option<f32>,
    pub double_sided: bool,
    /// Emitted as `KHR_materials_transmission`.
    pub transmission: Option<Transmission>,
    pub extras: Option<MaterialExtras>,
    pub flags: ShadingFlags,
}

fn material_name(config: &ShadingConfig) -> &str {
    config.name.as_deref().unwrap_or("<unnamed>")
}

fn pbr_params(config: &ShadingConfig) -> PbrParams {
    PbrParams {
        base_color: config.base_color,
        base_color_texture: config.base_color_texture.clone(),
        metallic: config.metallic,
        roughness: config.roughness,
        metallic_roughness_texture: config.metallic_roughness_texture.clone(),
        normal_texture: config.normal_texture.clone(),
        normal_scale: config.normal_scale,
        occlusion_texture: config.occlusion_texture.clone(),
        occlusion_strength: config.occlusion_strength,
        emissive_color: config.emissive_color,
        emissive_texture: config.emissive_texture.clone(),
    }
}

fn requested_alpha(flags: ShadingFlags, config: &ShadingConfig) -> (AlphaMode, Option<f32>) {
    if let Some(threshold) = config.alpha.mask_threshold {
        let cutoff = ((threshold - DEFAULT_ALPHA_CUTOFF).abs() > CUTOFF_EPSILON).then_some(threshold);
        (AlphaMode::Mask, cutoff)
    } else if flags.blend {
        (AlphaMode::Blend, None)
    } else {
        (AlphaMode::Opaque, None)
    }
}

/// Pick the material model for `config` and resolve alpha and transmission.
pub fn convert(config: &ShadingConfig, settings: &ExportSettings, log: &mut ExportLog) -> ConvertedMaterial {
    let flags = ShadingFlags::derive(config, settings);
    let (mut alpha_mode, alpha_cutoff) = requested_alpha(flags, config);
    let mut extras = None;

    let mut variant = if let Some(sg) = &config.specular_glossiness {
        if config.special.is_some() || config.unlit {
            log.warn(
                LogCode::MaterialFallback,
                format!(
                    "material '{}': specular-glossiness takes precedence over unlit shading",
                    material_name(config)
                ),
            );
        }
        MaterialVariant::SpecularGlossiness(sg.clone())
    } else {
        match &config.special {
            Some(SpecialShader::ParticlesUnlit(params)) => {
                if alpha_mode == AlphaMode::Opaque {
                    alpha_mode = match params.blend_mode {
                        ParticleBlendMode::Premultiply => AlphaMode::PremultipliedBlend,
                        ParticleBlendMode::Alpha
                        | ParticleBlendMode::Additive
                        | ParticleBlendMode::Multiply => AlphaMode::Blend,
                    };
                }
                extras = Some(MaterialExtras::Particles(params.clone()));
                MaterialVariant::Unlit {
                    base_color: params.color,
                    base_color_texture: config.base_color_texture.clone(),
                }
            }
            Some(SpecialShader::Skybox(params)) => {
                let tint = match params {
                    SkyboxParams::SixSided { tint, .. } | SkyboxParams::Equirectangular { tint, .. } => *tint,
                    SkyboxParams::Procedural { sky_tint, .. } => *sky_tint,
                };
                extras = Some(MaterialExtras::Skybox(params.clone()));
                MaterialVariant::Unlit {
                    base_color: tint,
                    base_color_texture: None,
                }
            }
            None if config.unlit => MaterialVariant::Unlit {
                base_color: config.base_color,
                base_color_texture: config.base_color_texture.clone(),
            },
            None => MaterialVariant::MetallicRoughness(pbr_params(config)),
        }
    };

    let mut transmission = None;
    if let Some(t) = config.transmission.as_ref().filter(|_| flags.transmission) {
        if settings.transmission_extension {
            transmission = Some(t.clone());
        } else if flags.transmission_fold {
            let alpha = variant.base_alpha_mut();
            *alpha *= 1.0 - t.factor.clamp(0.0, 1.0);
            alpha_mode = if flags.base_texture_alpha {
                AlphaMode::PremultipliedBlend
            } else {
                AlphaMode::Blend
            };
            log.warn(
                LogCode::TransmissionFolded,
                format!(
                    "material '{}': transmission {} folded into base color alpha",
                    material_name(config),
                    t.factor
                ),
            );
        } else {
            log.warn(
                LogCode::MaterialFallback,
                format!(
                    "material '{}': transmission texture dropped, extension disabled",
                    material_name(config)
                ),
            );
        }
    }

    ConvertedMaterial {
        name: config.name.clone(),
        variant,
        alpha_cutoff: if alpha_mode == AlphaMode::Mask { alpha_cutoff } else { None },
        alpha_mode,
        double_sided: config.double_sided,
        transmission,
        extras,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::host::{AlphaSettings, TextureAsset};

    fn settings() -> ExportSettings {
        ExportSettings::default()
    }

    #[test]
    fn test_plain_pbr() {
        let mut log = ExportLog::new();
        let converted = convert(&ShadingConfig::named("plain"), &settings(), &mut log);
        assert!(matches!(converted.variant, MaterialVariant::MetallicRoughness(_)));
        assert_eq!(converted.alpha_mode, AlphaMode::Opaque);
        assert!(log.is_empty());
    }

    #[test]
    fn test_default_cutoff_omitted() {
        let mut log = ExportLog::new();
        let mut config = ShadingConfig::named("cut");
        config.alpha.mask_threshold = Some(0.5);
        let converted = convert(&config, &settings(), &mut log);
        assert_eq!(converted.alpha_mode, AlphaMode::Mask);
        assert_eq!(converted.alpha_cutoff, None);

        config.alpha.mask_threshold = Some(0.3);
        let converted = convert(&config, &settings(), &mut log);
        assert_eq!(converted.alpha_cutoff, Some(0.3));
    }

    #[test]
    fn test_mask_beats_translucent() {
        let mut log = ExportLog::new();
        let mut config = ShadingConfig::named("both");
        config.alpha = AlphaSettings {
            mask_threshold: Some(0.2),
            translucent: true,
        };
        assert_eq!(convert(&config, &settings(), &mut log).alpha_mode, AlphaMode::Mask);
    }

    #[test]
    fn test_spec_gloss_wins_over_unlit() {
        let mut log = ExportLog::new();
        let mut config = ShadingConfig::named("sg");
        config.unlit = true;
        config.specular_glossiness = Some(SpecularGlossiness::default());
        let converted = convert(&config, &settings(), &mut log);
        assert!(matches!(converted.variant, MaterialVariant::SpecularGlossiness(_)));
        assert!(log.has_code(LogCode::MaterialFallback));
    }

    #[test]
    fn test_particles_use_params_color() {
        let mut log = ExportLog::new();
        let mut config = ShadingConfig::named("fx");
        config.special = Some(SpecialShader::ParticlesUnlit(ParticleParams {
            color: [0.2, 0.4, 0.6, 0.8],
            blend_mode: ParticleBlendMode::Premultiply,
            ..ParticleParams::default()
        }));
        let converted = convert(&config, &settings(), &mut log);
        match converted.variant {
            MaterialVariant::Unlit { base_color, .. } => assert_eq!(base_color, [0.2, 0.4, 0.6, 0.8]),
            other => panic!("expected unlit, got {other:?}"),
        }
        assert_eq!(converted.alpha_mode, AlphaMode::PremultipliedBlend);
        assert!(matches!(converted.extras, Some(MaterialExtras::Particles(_))));
    }

    #[test]
    fn test_transmission_folds_without_extension() {
        let mut log = ExportLog::new();
        let mut config = ShadingConfig::named("glass");
        config.base_color = [1.0, 1.0, 1.0, 0.8];
        config.transmission = Some(Transmission {
            factor: 0.5,
            texture: None,
        });
        let settings = settings().with_transmission_extension(false);

        let converted = convert(&config, &settings, &mut log);
        let MaterialVariant::MetallicRoughness(pbr) = &converted.variant else {
            panic!("expected pbr");
        };
        assert!((pbr.base_color[3] - 0.4).abs() < 1e-6);
        assert_eq!(converted.alpha_mode, AlphaMode::Blend);
        assert!(converted.transmission.is_none());
        assert!(log.has_code(LogCode::TransmissionFolded));
    }

    #[test]
    fn test_transmission_fold_with_alpha_texture_is_premultiplied() {
        let mut log = ExportLog::new();
        let mut config = ShadingConfig::named("glass");
        let texture = Arc::new(TextureAsset::rgba8("t", 1, 1, vec![0, 0, 0, 0]));
        config.base_color_texture = Some(TextureSlot::new(texture));
        config.transmission = Some(Transmission {
            factor: 1.0,
            texture: None,
        });
        let settings = settings().with_transmission_extension(false);
        let converted = convert(&config, &settings, &mut log);
        assert_eq!(converted.alpha_mode, AlphaMode::PremultipliedBlend);
    }

    #[test]
    fn test_transmission_kept_with_extension() {
        let mut log = ExportLog::new();
        let mut config = ShadingConfig::named("glass");
        config.transmission = Some(Transmission {
            factor: 0.7,
            texture: None,
        });
        let converted = convert(&config, &settings(), &mut log);
        assert_eq!(converted.transmission.map(|t| t.factor), Some(0.7));
        assert_eq!(converted.alpha_mode, AlphaMode::Opaque);
    }
}

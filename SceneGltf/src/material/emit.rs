//! Document entries for converted materials.

use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::buffer::BufferPacker;
use crate::document::extensions::{
    KHR_TEXTURE_TRANSFORM, MaterialExtensions, MaterialsTransmission, MaterialsUnlit,
    PbrSpecularGlossiness, TextureInfoExtensions, TextureTransform,
};
use crate::document::{
    GltfAlphaMode, GltfDocument, GltfMaterial, GltfNormalTextureInfo, GltfOcclusionTextureInfo,
    GltfPbrMetallicRoughness, GltfTextureInfo,
};
use crate::environment::{SKYBOX_EXTRAS_KEY, SkyboxDescriptor};
use crate::host::{SkyboxParams, TextureSlot};
use crate::log::{ExportLog, LogCode};
use crate::texture::{ImageEncoder, TextureRegistry};

use super::{AlphaMode, ConvertedMaterial, MaterialExtras, MaterialVariant};

/// Extras key carrying unlit particle parameters.
pub const PARTICLES_EXTRAS_KEY: &str = "particlesUnlit";
/// Extras flag marking premultiplied alpha on a `BLEND` material.
pub const PREMULTIPLIED_EXTRAS_KEY: &str = "premultipliedAlpha";

/// Roughness written in the metallic-roughness fallback of unlit materials.
const UNLIT_FALLBACK_ROUGHNESS: f32 = 0.9;

/// Session state touched while emitting a material.
pub(crate) struct EmitContext<'a> {
    pub textures: &'a mut TextureRegistry,
    pub doc: &'a mut GltfDocument,
    pub packer: &'a mut BufferPacker,
    pub encoder: &'a dyn ImageEncoder,
    pub log: &'a mut ExportLog,
    pub extensions_used: &'a mut IndexSet<&'static str>,
    pub texture_transform: bool,
}

/// `texture` index, `texCoord` and transform extension of a resolved slot.
struct ResolvedSlot {
    index: u32,
    tex_coord: Option<u32>,
    extensions: Option<TextureInfoExtensions>,
}

impl EmitContext<'_> {
    fn resolve(&mut self, slot: Option<&TextureSlot>, material: &str) -> Option<ResolvedSlot> {
        let slot = slot?;
        let index = self.textures.register(
            &slot.texture,
            self.doc,
            self.packer,
            self.encoder,
            self.log,
        )?;

        let extensions = if slot.transform.is_identity() {
            None
        } else if self.texture_transform {
            self.extensions_used.insert(KHR_TEXTURE_TRANSFORM);
            Some(TextureInfoExtensions {
                texture_transform: Some(TextureTransform {
                    offset: slot.transform.offset,
                    rotation: slot.transform.rotation,
                    scale: slot.transform.scale,
                    tex_coord: None,
                }),
            })
        } else {
            self.log.warn(
                LogCode::TextureTransformDropped,
                format!("material '{material}': UV transform dropped, extension disabled"),
            );
            None
        };

        Some(ResolvedSlot {
            index,
            tex_coord: (slot.uv_channel != 0).then_some(slot.uv_channel),
            extensions,
        })
    }

    fn texture_info(&mut self, slot: Option<&TextureSlot>, material: &str) -> Option<GltfTextureInfo> {
        self.resolve(slot, material).map(|r| GltfTextureInfo {
            index: r.index,
            tex_coord: r.tex_coord,
            extensions: r.extensions,
        })
    }

    fn skybox_descriptor(&mut self, params: &SkyboxParams, material: &str) -> SkyboxDescriptor {
        match params {
            SkyboxParams::SixSided {
                faces,
                tint,
                exposure,
                rotation,
            } => SkyboxDescriptor::SixSided {
                faces: faces
                    .iter()
                    .map(|face| {
                        self.textures
                            .register(face, self.doc, self.packer, self.encoder, self.log)
                    })
                    .collect(),
                tint: *tint,
                exposure: *exposure,
                rotation: *rotation,
            },
            SkyboxParams::Equirectangular {
                texture,
                tint,
                exposure,
                rotation,
            } => {
                let texture = self
                    .textures
                    .register(texture, self.doc, self.packer, self.encoder, self.log);
                if texture.is_none() {
                    self.log.warn(
                        LogCode::MaterialFallback,
                        format!("material '{material}': skybox exported without its panorama"),
                    );
                }
                SkyboxDescriptor::Equirectangular {
                    texture,
                    tint: *tint,
                    exposure: *exposure,
                    rotation: *rotation,
                }
            }
            SkyboxParams::Procedural {
                sun_size,
                atmosphere_thickness,
                sky_tint,
                ground_color,
                exposure,
            } => SkyboxDescriptor::Procedural {
                sun_size: *sun_size,
                atmosphere_thickness: *atmosphere_thickness,
                sky_tint: *sky_tint,
                ground_color: *ground_color,
                exposure: *exposure,
            },
        }
    }
}

fn note_extensions(extensions: &MaterialExtensions, used: &mut IndexSet<&'static str>) {
    for name in extensions.names() {
        used.insert(name);
    }
}

/// Build the document entry for `converted`, registering its textures.
pub(crate) fn emit_material(converted: &ConvertedMaterial, ctx: &mut EmitContext<'_>) -> GltfMaterial {
    let label = converted.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
    let label = label.as_str();
    let mut material = GltfMaterial {
        name: converted.name.clone(),
        ..GltfMaterial::default()
    };
    let mut extensions = MaterialExtensions::default();

    match &converted.variant {
        MaterialVariant::MetallicRoughness(pbr) => {
            material.pbr_metallic_roughness = Some(GltfPbrMetallicRoughness {
                base_color_factor: Some(pbr.base_color),
                base_color_texture: ctx.texture_info(pbr.base_color_texture.as_ref(), label),
                metallic_factor: Some(pbr.metallic),
                roughness_factor: Some(pbr.roughness),
                metallic_roughness_texture: ctx
                    .texture_info(pbr.metallic_roughness_texture.as_ref(), label),
            });
            material.normal_texture = ctx.resolve(pbr.normal_texture.as_ref(), label).map(|r| {
                GltfNormalTextureInfo {
                    index: r.index,
                    scale: Some(pbr.normal_scale),
                    tex_coord: r.tex_coord,
                    extensions: r.extensions,
                }
            });
            material.occlusion_texture =
                ctx.resolve(pbr.occlusion_texture.as_ref(), label)
                    .map(|r| GltfOcclusionTextureInfo {
                        index: r.index,
                        strength: Some(pbr.occlusion_strength),
                        tex_coord: r.tex_coord,
                        extensions: r.extensions,
                    });
            material.emissive_texture = ctx.texture_info(pbr.emissive_texture.as_ref(), label);
            if pbr.emissive_color != [0.0, 0.0, 0.0] || material.emissive_texture.is_some() {
                material.emissive_factor = Some(pbr.emissive_color);
            }
        }
        MaterialVariant::SpecularGlossiness(sg) => {
            let diffuse_texture = ctx.texture_info(sg.diffuse_texture.as_ref(), label);
            material.pbr_metallic_roughness = Some(GltfPbrMetallicRoughness {
                base_color_factor: Some(sg.diffuse_color),
                base_color_texture: diffuse_texture.clone(),
                metallic_factor: Some(0.0),
                roughness_factor: Some(1.0 - sg.glossiness),
                metallic_roughness_texture: None,
            });
            extensions.pbr_specular_glossiness = Some(PbrSpecularGlossiness {
                diffuse_factor: sg.diffuse_color,
                specular_factor: sg.specular_color,
                glossiness_factor: sg.glossiness,
                diffuse_texture,
                specular_glossiness_texture: ctx
                    .texture_info(sg.specular_glossiness_texture.as_ref(), label),
            });
        }
        MaterialVariant::Unlit {
            base_color,
            base_color_texture,
        } => {
            material.pbr_metallic_roughness = Some(GltfPbrMetallicRoughness {
                base_color_factor: Some(*base_color),
                base_color_texture: ctx.texture_info(base_color_texture.as_ref(), label),
                metallic_factor: Some(0.0),
                roughness_factor: Some(UNLIT_FALLBACK_ROUGHNESS),
                metallic_roughness_texture: None,
            });
            extensions.unlit = Some(MaterialsUnlit {});
        }
    }

    if let Some(transmission) = &converted.transmission {
        extensions.transmission = Some(MaterialsTransmission {
            transmission_factor: transmission.factor,
            transmission_texture: ctx.texture_info(transmission.texture.as_ref(), label),
        });
    }

    material.alpha_mode = match converted.alpha_mode {
        AlphaMode::Opaque => None,
        AlphaMode::Mask => Some(GltfAlphaMode::Mask),
        AlphaMode::Blend | AlphaMode::PremultipliedBlend => Some(GltfAlphaMode::Blend),
    };
    material.alpha_cutoff = converted.alpha_cutoff;
    material.double_sided = converted.double_sided.then_some(true);

    let mut extras = Map::new();
    if converted.alpha_mode == AlphaMode::PremultipliedBlend {
        extras.insert(PREMULTIPLIED_EXTRAS_KEY.to_string(), Value::Bool(true));
    }
    match &converted.extras {
        Some(MaterialExtras::Particles(params)) => match serde_json::to_value(params) {
            Ok(value) => {
                extras.insert(PARTICLES_EXTRAS_KEY.to_string(), value);
            }
            Err(e) => ctx.log.warn(
                LogCode::MaterialFallback,
                format!("material '{label}': particle parameters not serializable: {e}"),
            ),
        },
        Some(MaterialExtras::Skybox(params)) => {
            let descriptor = ctx.skybox_descriptor(params, label);
            match serde_json::to_value(descriptor) {
                Ok(value) => {
                    extras.insert(SKYBOX_EXTRAS_KEY.to_string(), value);
                }
                Err(e) => ctx.log.warn(
                    LogCode::MaterialFallback,
                    format!("material '{label}': skybox parameters not serializable: {e}"),
                ),
            }
        }
        None => {}
    }
    if !extras.is_empty() {
        material.extras = Some(Value::Object(extras));
    }

    if !extensions.is_empty() {
        note_extensions(&extensions, ctx.extensions_used);
        material.extensions = Some(extensions);
    }
    material
}

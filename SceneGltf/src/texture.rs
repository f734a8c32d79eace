//! Texture, image and sampler registration.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::Arc;

use image::{ImageBuffer, RgbaImage};

use crate::buffer::BufferPacker;
use crate::document::{GltfDocument, GltfImage, GltfSampler, GltfTexture};
use crate::error::{Error, Result};
use crate::host::{FilterMode, ImageMime, SamplerSettings, TextureAsset, TextureSource, WrapMode};
use crate::log::{ExportLog, LogCode};
use crate::registry::{ArcKey, ResourceRegistry};

/// Pixel codec for raw RGBA8 textures.
pub trait ImageEncoder {
    /// Encode tightly packed RGBA8 pixels.
    fn encode_rgba8(&self, width: u32, height: u32, pixels: &[u8]) -> Result<(Vec<u8>, ImageMime)>;
}

/// PNG codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngImageEncoder;

impl ImageEncoder for PngImageEncoder {
    fn encode_rgba8(&self, width: u32, height: u32, pixels: &[u8]) -> Result<(Vec<u8>, ImageMime)> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::TexturePixelSize {
                width,
                height,
                expected,
                found: pixels.len(),
            });
        }

        let img: RgbaImage = ImageBuffer::from_raw(width, height, pixels.to_vec()).ok_or(
            Error::TexturePixelSize {
                width,
                height,
                expected,
                found: pixels.len(),
            },
        )?;

        let mut png_data = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_data);
        img.write_with_encoder(encoder)
            .map_err(|e| Error::PngEncodeFailed {
                message: e.to_string(),
            })?;
        Ok((png_data, ImageMime::Png))
    }
}

fn sampler_entry(settings: SamplerSettings) -> GltfSampler {
    let (mag, min) = match settings.filter {
        FilterMode::Point => (9728, 9984),     // NEAREST, NEAREST_MIPMAP_NEAREST
        FilterMode::Bilinear => (9729, 9985),  // LINEAR, LINEAR_MIPMAP_NEAREST
        FilterMode::Trilinear => (9729, 9987), // LINEAR, LINEAR_MIPMAP_LINEAR
    };
    let wrap = |mode: WrapMode| match mode {
        WrapMode::Repeat => 10497,
        WrapMode::Clamp => 33071,
        WrapMode::Mirror => 33648,
    };
    GltfSampler {
        mag_filter: Some(mag),
        min_filter: Some(min),
        wrap_s: Some(wrap(settings.wrap_u)),
        wrap_t: Some(wrap(settings.wrap_v)),
    }
}

/// Session texture cache. One image per texture; samplers are shared by value.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    textures: ResourceRegistry<ArcKey<TextureAsset>>,
    samplers: ResourceRegistry<SamplerSettings>,
    failed: HashSet<ArcKey<TextureAsset>>,
}

impl TextureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture index for `asset`, encoding and embedding it on first use.
    ///
    /// Encoding failures are logged once per texture and yield `None`.
    pub fn register(
        &mut self,
        asset: &Arc<TextureAsset>,
        doc: &mut GltfDocument,
        packer: &mut BufferPacker,
        encoder: &dyn ImageEncoder,
        log: &mut ExportLog,
    ) -> Option<u32> {
        let key = ArcKey::new(asset);
        if self.failed.contains(&key) {
            return None;
        }

        let samplers = &mut self.samplers;
        let result = self.textures.get_or_try_insert_with(key.clone(), |_| {
            let (bytes, mime) = encode(asset, encoder)?;
            let buffer_view = packer.add_image_bytes(&bytes);
            let image = doc.images.len() as u32;
            doc.images.push(GltfImage {
                buffer_view,
                mime_type: mime.as_str().to_string(),
                name: asset.name.clone(),
            });

            let registration = samplers.register(asset.sampler);
            if registration.is_new() {
                doc.samplers.push(sampler_entry(asset.sampler));
            }

            doc.textures.push(GltfTexture {
                source: image,
                sampler: Some(registration.index()),
                name: asset.name.clone(),
            });
            tracing::debug!(texture = ?asset.name, image, "registered texture");
            Ok::<(), Error>(())
        });

        match result {
            Ok(index) => Some(index),
            Err(e) => {
                log.warn(
                    LogCode::TextureFailed,
                    format!(
                        "texture '{}' skipped: {e}",
                        asset.name.as_deref().unwrap_or("<unnamed>")
                    ),
                );
                self.failed.insert(key);
                None
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn encode(asset: &TextureAsset, encoder: &dyn ImageEncoder) -> Result<(Vec<u8>, ImageMime)> {
    match &asset.source {
        TextureSource::Encoded { bytes, .. } if bytes.is_empty() => Err(Error::EmptyRange {
            owner: format!("image of '{}'", asset.name.as_deref().unwrap_or("<unnamed>")),
        }),
        TextureSource::Encoded { bytes, mime } => Ok((bytes.clone(), *mime)),
        TextureSource::Rgba8 {
            width,
            height,
            pixels,
        } => encoder.encode_rgba8(*width, *height, pixels),
    }
}

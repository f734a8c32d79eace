//! Export configuration.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Single self-contained `.glb`
    #[default]
    Binary,
    /// `.gltf` JSON with an external or embedded buffer
    Json,
}

impl ExportFormat {
    /// Pick the format from an output file extension (`.gltf` is JSON, anything else binary).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gltf") => Self::Json,
            _ => Self::Binary,
        }
    }
}

/// Where the binary buffer goes in JSON mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BufferLocation {
    /// `<stem>.bin` next to the `.gltf`
    #[default]
    SiblingFile,
    /// Base64 `data:` URI inside the JSON
    DataUri,
}

/// Settings for one export session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub buffer_location: BufferLocation,
    /// `asset.generator` string
    pub generator: String,
    /// Export nodes whose active flag is off
    pub include_inactive: bool,
    /// Bit mask of rendering layers whose content is exported
    pub layer_mask: u32,
    /// Default material targets point rendering (unlit, no culling)
    pub point_cloud_support: bool,
    /// Use a generated default material for empty material slots
    pub default_material: bool,
    /// Target understands `KHR_materials_transmission`
    pub transmission_extension: bool,
    /// Target understands `KHR_texture_transform`
    pub texture_transform_extension: bool,
    /// Target understands `KHR_lights_punctual`
    pub lights_extension: bool,
    pub export_cameras: bool,
    pub export_lights: bool,
    /// Indent JSON output
    pub pretty_json: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Binary,
            buffer_location: BufferLocation::SiblingFile,
            generator: format!("SceneGltf {}", crate::VERSION),
            include_inactive: false,
            layer_mask: u32::MAX,
            point_cloud_support: false,
            default_material: false,
            transmission_extension: true,
            texture_transform_extension: true,
            lights_extension: true,
            export_cameras: true,
            export_lights: true,
            pretty_json: false,
        }
    }
}

impl ExportSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layer_mask == 0 {
            return Err(Error::SettingsInvalid {
                message: "layer_mask must include at least one layer".to_string(),
            });
        }
        if self.generator.trim().is_empty() {
            return Err(Error::SettingsInvalid {
                message: "generator must not be empty".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_buffer_location(mut self, location: BufferLocation) -> Self {
        self.buffer_location = location;
        self
    }

    #[must_use]
    pub fn with_include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = include;
        self
    }

    #[must_use]
    pub fn with_layer_mask(mut self, mask: u32) -> Self {
        self.layer_mask = mask;
        self
    }

    #[must_use]
    pub fn with_point_cloud_support(mut self, enabled: bool) -> Self {
        self.point_cloud_support = enabled;
        self
    }

    #[must_use]
    pub fn with_default_material(mut self, enabled: bool) -> Self {
        self.default_material = enabled;
        self
    }

    #[must_use]
    pub fn with_transmission_extension(mut self, enabled: bool) -> Self {
        self.transmission_extension = enabled;
        self
    }

    #[must_use]
    pub fn with_texture_transform_extension(mut self, enabled: bool) -> Self {
        self.texture_transform_extension = enabled;
        self
    }

    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// Whether a node on `layer` passes the layer mask.
    #[must_use]
    pub fn layer_included(&self, layer: u32) -> bool {
        layer < 32 && self.layer_mask & (1 << layer) != 0
    }

    /// Lights are written only when both requested and supported by the target.
    #[must_use]
    pub fn lights_enabled(&self) -> bool {
        self.export_lights && self.lights_extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = ExportSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.layer_included(0));
        assert!(settings.layer_included(31));
        assert!(!settings.layer_included(32));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = ExportSettings::from_toml_str(
            r#"
            format = "json"
            buffer_location = "data-uri"
            layer_mask = 5
            transmission_extension = false
            "#,
        )
        .expect("valid settings");

        assert_eq!(settings.format, ExportFormat::Json);
        assert_eq!(settings.buffer_location, BufferLocation::DataUri);
        assert!(settings.layer_included(2));
        assert!(!settings.layer_included(1));
        assert!(!settings.transmission_extension);
        assert!(settings.texture_transform_extension);
    }

    #[test]
    fn test_zero_layer_mask_rejected() {
        let result = ExportSettings::from_toml_str("layer_mask = 0");
        assert!(matches!(result, Err(Error::SettingsInvalid { .. })));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ExportSettings::from_toml_str("bogus = true");
        assert!(matches!(result, Err(Error::SettingsParse(_))));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("a/b.gltf")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("a/b.GLB")), ExportFormat::Binary);
    }
}

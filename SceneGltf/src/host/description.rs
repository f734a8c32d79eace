//! JSON scene descriptions.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! A small, host-independent way to feed scenes to the CLI and to tests:
//! textures, materials and meshes are listed once and referenced by index
//! from a nested node tree, so shared references become shared `Arc`s.

use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::Deserialize;

use crate::error::{Error, Result};

use super::{
    AlphaSettings, CameraData, ImageMime, LightData, LightKind, MemoryNode, MemoryScene,
    MeshData, NodeFlags, NodeHandle, Projection, Renderable, ShadingConfig, SubMesh, TextureAsset,
    TextureSlot, Topology, Transform, Transmission,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
    #[serde(default)]
    pub textures: Vec<TextureDescription>,
    #[serde(default)]
    pub materials: Vec<MaterialDescription>,
    #[serde(default)]
    pub meshes: Vec<MeshDescription>,
    pub nodes: Vec<NodeDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureDescription {
    pub name: Option<String>,
    /// Path to a PNG/JPEG file, relative to the description file.
    pub path: String,
    #[serde(default)]
    pub has_alpha: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialDescription {
    pub name: Option<String>,
    pub base_color: [f32; 4],
    pub base_color_texture: Option<usize>,
    pub metallic: f32,
    pub roughness: f32,
    pub normal_texture: Option<usize>,
    pub emissive: [f32; 3],
    pub unlit: bool,
    pub alpha_cutoff: Option<f32>,
    pub translucent: bool,
    pub double_sided: bool,
    pub transmission: Option<f32>,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic: 0.0,
            roughness: 0.5,
            normal_texture: None,
            emissive: [0.0, 0.0, 0.0],
            unlit: false,
            alpha_cutoff: None,
            translucent: false,
            double_sided: false,
            transmission: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDescription {
    pub name: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    pub uvs: Vec<Vec<[f32; 2]>>,
    pub submeshes: Vec<SubMeshDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubMeshDescription {
    pub indices: Vec<u32>,
    #[serde(default)]
    pub topology: TopologyName,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopologyName {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

impl From<TopologyName> for Topology {
    fn from(name: TopologyName) -> Self {
        match name {
            TopologyName::Points => Self::Points,
            TopologyName::Lines => Self::Lines,
            TopologyName::LineStrip => Self::LineStrip,
            TopologyName::Triangles => Self::Triangles,
            TopologyName::TriangleStrip => Self::TriangleStrip,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum CameraDescription {
    Perspective {
        yfov: f32,
        aspect_ratio: Option<f32>,
        znear: f32,
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightDescription {
    #[serde(rename = "type")]
    pub kind: LightKindName,
    #[serde(default = "white")]
    pub color: [f32; 3],
    #[serde(default = "one")]
    pub intensity: f32,
    pub range: Option<f32>,
    pub inner_cone_angle: Option<f32>,
    pub outer_cone_angle: Option<f32>,
}

fn white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn one() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LightKindName {
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: Option<String>,
    pub id: Option<String>,
    pub translation: Option<[f32; 3]>,
    /// Quaternion, XYZW.
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub mesh: Option<usize>,
    /// One entry per submesh; `null` leaves the slot empty.
    #[serde(default)]
    pub materials: Vec<Option<usize>>,
    pub camera: Option<CameraDescription>,
    pub light: Option<LightDescription>,
    #[serde(default = "yes")]
    pub active: bool,
    #[serde(default)]
    pub editor_only: bool,
    #[serde(default)]
    pub layer: u32,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

fn yes() -> bool {
    true
}

impl SceneDescription {
    /// Parse a description from JSON text.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a description file and build the scene, resolving texture paths
    /// relative to the file's directory.
    ///
    /// # Errors
    /// Returns an error if the file or a texture cannot be read, or if an
    /// index in the description is out of range.
    pub fn load_scene(path: &Path) -> Result<MemoryScene> {
        let json = std::fs::read_to_string(path)?;
        let description = Self::from_json_str(&json)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        description.build(base)
    }

    /// Build a [`MemoryScene`].
    ///
    /// # Errors
    /// Returns an error if a texture cannot be read or an index is out of range.
    pub fn build(&self, base_dir: &Path) -> Result<MemoryScene> {
        let textures = self
            .textures
            .iter()
            .map(|t| load_texture(t, base_dir))
            .collect::<Result<Vec<_>>>()?;

        let materials = self
            .materials
            .iter()
            .map(|m| build_material(m, &textures).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let meshes: Vec<Arc<MeshData>> = self.meshes.iter().map(|m| Arc::new(build_mesh(m))).collect();

        let mut scene = MemoryScene::new();
        let lookup = Lookup {
            materials: &materials,
            meshes: &meshes,
        };
        for node in &self.nodes {
            add_node(&mut scene, None, node, &lookup)?;
        }
        Ok(scene)
    }
}

struct Lookup<'a> {
    materials: &'a [Arc<ShadingConfig>],
    meshes: &'a [Arc<MeshData>],
}

fn out_of_range(kind: &str, index: usize, len: usize) -> Error {
    Error::SceneDescriptionInvalid {
        message: format!("{kind} index {index} out of range ({len} defined)"),
    }
}

fn load_texture(desc: &TextureDescription, base_dir: &Path) -> Result<Arc<TextureAsset>> {
    let path = base_dir.join(&desc.path);
    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageMime::from_extension)
        .ok_or_else(|| Error::SceneDescriptionInvalid {
            message: format!("unsupported texture format: {}", desc.path),
        })?;
    let bytes = std::fs::read(&path)?;
    let name = desc.name.clone().unwrap_or_else(|| desc.path.clone());
    let mut asset = TextureAsset::encoded(name, bytes, mime);
    asset.has_alpha = desc.has_alpha;
    Ok(Arc::new(asset))
}

fn texture_slot(textures: &[Arc<TextureAsset>], index: Option<usize>) -> Result<Option<TextureSlot>> {
    index
        .map(|i| {
            textures
                .get(i)
                .map(|t| TextureSlot::new(Arc::clone(t)))
                .ok_or_else(|| out_of_range("texture", i, textures.len()))
        })
        .transpose()
}

fn build_material(desc: &MaterialDescription, textures: &[Arc<TextureAsset>]) -> Result<ShadingConfig> {
    Ok(ShadingConfig {
        name: desc.name.clone(),
        base_color: desc.base_color,
        base_color_texture: texture_slot(textures, desc.base_color_texture)?,
        metallic: desc.metallic,
        roughness: desc.roughness,
        normal_texture: texture_slot(textures, desc.normal_texture)?,
        emissive_color: desc.emissive,
        unlit: desc.unlit,
        alpha: AlphaSettings {
            mask_threshold: desc.alpha_cutoff,
            translucent: desc.translucent,
        },
        transmission: desc.transmission.map(|factor| Transmission {
            factor,
            texture: None,
        }),
        double_sided: desc.double_sided,
        ..ShadingConfig::default()
    })
}

fn build_mesh(desc: &MeshDescription) -> MeshData {
    MeshData {
        name: desc.name.clone(),
        positions: desc.positions.clone(),
        normals: desc.normals.clone(),
        tangents: None,
        uvs: desc.uvs.clone(),
        colors: None,
        submeshes: desc
            .submeshes
            .iter()
            .map(|s| SubMesh {
                indices: s.indices.clone(),
                topology: s.topology.into(),
            })
            .collect(),
    }
}

fn build_camera(desc: &CameraDescription) -> CameraData {
    let projection = match *desc {
        CameraDescription::Perspective {
            yfov,
            aspect_ratio,
            znear,
            zfar,
        } => Projection::Perspective {
            yfov,
            aspect_ratio,
            znear,
            zfar,
        },
        CameraDescription::Orthographic {
            xmag,
            ymag,
            znear,
            zfar,
        } => Projection::Orthographic {
            xmag,
            ymag,
            znear,
            zfar,
        },
    };
    CameraData {
        name: None,
        projection,
    }
}

fn build_light(desc: &LightDescription) -> LightData {
    let kind = match desc.kind {
        LightKindName::Directional => LightKind::Directional,
        LightKindName::Point => LightKind::Point,
        LightKindName::Spot => LightKind::Spot {
            inner_cone_angle: desc.inner_cone_angle.unwrap_or(0.0),
            outer_cone_angle: desc.outer_cone_angle.unwrap_or(std::f32::consts::FRAC_PI_4),
        },
    };
    LightData {
        name: None,
        kind,
        color: desc.color,
        intensity: desc.intensity,
        range: desc.range,
    }
}

fn add_node(
    scene: &mut MemoryScene,
    parent: Option<NodeHandle>,
    desc: &NodeDescription,
    lookup: &Lookup<'_>,
) -> Result<()> {
    let mut node = MemoryNode::default()
        .with_transform(Transform {
            translation: desc.translation.map_or(Vec3::ZERO, Vec3::from),
            rotation: desc.rotation.map_or(Quat::IDENTITY, Quat::from_array),
            scale: desc.scale.map_or(Vec3::ONE, Vec3::from),
        })
        .with_flags(NodeFlags {
            active: desc.active,
            editor_only: desc.editor_only,
            layer: desc.layer,
        });
    node.name = desc.name.clone();
    node.external_id = desc.id.clone();

    if let Some(mesh_index) = desc.mesh {
        let mesh = lookup
            .meshes
            .get(mesh_index)
            .ok_or_else(|| out_of_range("mesh", mesh_index, lookup.meshes.len()))?;
        let materials = desc
            .materials
            .iter()
            .map(|slot| {
                slot.map(|i| {
                    lookup
                        .materials
                        .get(i)
                        .cloned()
                        .ok_or_else(|| out_of_range("material", i, lookup.materials.len()))
                })
                .transpose()
            })
            .collect::<Result<Vec<_>>>()?;
        node = node.with_renderable(Renderable::new(Arc::clone(mesh), materials));
    } else if let Some(camera) = &desc.camera {
        node = node.with_camera(build_camera(camera));
    } else if let Some(light) = &desc.light {
        node = node.with_light(build_light(light));
    }

    let handle = match parent {
        Some(parent) => scene.add_child(parent, node),
        None => scene.add_root(node),
    };
    for child in &desc.children {
        add_node(scene, Some(handle), child, lookup)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{NodeContent, SceneProvider};

    const SCENE: &str = r#"{
        "materials": [{ "name": "red", "baseColor": [1, 0, 0, 1], "alphaCutoff": 0.3 }],
        "meshes": [{
            "name": "tri",
            "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
            "submeshes": [{ "indices": [0, 1, 2] }]
        }],
        "nodes": [{
            "name": "root",
            "translation": [0, 1, 0],
            "children": [
                { "name": "a", "mesh": 0, "materials": [0] },
                { "name": "b", "mesh": 0, "materials": [0] },
                { "name": "sun", "light": { "type": "directional", "intensity": 3 } }
            ]
        }]
    }"#;

    #[test]
    fn test_shared_resources_share_arcs() {
        let scene = SceneDescription::from_json_str(SCENE)
            .and_then(|d| d.build(Path::new(".")))
            .expect("valid description");
        let root = scene.roots()[0];
        let children = scene.children(root);
        assert_eq!(children.len(), 3);

        let (NodeContent::Renderable(a), NodeContent::Renderable(b)) =
            (scene.content(children[0]), scene.content(children[1]))
        else {
            panic!("expected renderables");
        };
        assert!(Arc::ptr_eq(&a.mesh, &b.mesh));
        let (Some(ma), Some(mb)) = (&a.materials[0], &b.materials[0]) else {
            panic!("expected materials");
        };
        assert!(Arc::ptr_eq(ma, mb));
        assert_eq!(ma.alpha.mask_threshold, Some(0.3));
        assert!(matches!(scene.content(children[2]), NodeContent::Light(_)));
    }

    #[test]
    fn test_bad_material_index() {
        let json = r#"{
            "meshes": [{ "positions": [[0,0,0]], "submeshes": [{ "indices": [0], "topology": "points" }] }],
            "nodes": [{ "mesh": 0, "materials": [4] }]
        }"#;
        let result = SceneDescription::from_json_str(json).and_then(|d| d.build(Path::new(".")));
        assert!(matches!(result, Err(Error::SceneDescriptionInvalid { .. })));
    }
}

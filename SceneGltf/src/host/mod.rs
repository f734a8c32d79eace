//! Host scene-graph capability surface.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! The exporter never looks at a host's own scene representation. It asks a
//! [`SceneProvider`] for children, transforms, flags and node content, and
//! receives plain data (meshes, shading configurations, textures) behind
//! `Arc`s whose pointer identity drives deduplication.

pub mod description;
mod memory;
mod mesh;
mod shading;

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

pub use memory::{MemoryNode, MemoryScene, NodeHandle};
pub use mesh::{MeshData, SubMesh, Topology};
pub use shading::{
    AlphaSettings, FilterMode, ImageMime, ParticleBlendMode, ParticleColorMode, ParticleParams,
    SamplerSettings, ShadingConfig, SkyboxParams, SpecialShader, SpecularGlossiness,
    TextureAsset, TextureSlot, TextureSource, Transmission, UvTransform, WrapMode,
};

/// Local TRS transform of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[must_use]
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-node flags that drive the exclusion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeFlags {
    /// Whether the node itself is active.
    pub active: bool,
    /// Editor-only nodes never reach the document.
    pub editor_only: bool,
    /// Rendering layer (0-31), tested against `ExportSettings::layer_mask`.
    pub layer: u32,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            active: true,
            editor_only: false,
            layer: 0,
        }
    }
}

/// Geometry attached to a node, with one material slot per submesh.
#[derive(Debug, Clone)]
pub struct Renderable {
    pub mesh: Arc<MeshData>,
    pub materials: Vec<Option<Arc<ShadingConfig>>>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

impl Renderable {
    #[must_use]
    pub fn new(mesh: Arc<MeshData>, materials: Vec<Option<Arc<ShadingConfig>>>) -> Self {
        Self {
            mesh,
            materials,
            cast_shadows: true,
            receive_shadows: true,
        }
    }
}

/// Camera projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        yfov: f32,
        aspect_ratio: Option<f32>,
        znear: f32,
        /// `None` means an infinite projection.
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraData {
    pub name: Option<String>,
    pub projection: Projection,
}

/// Punctual light type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Point,
    Spot {
        /// Inner cone angle in radians.
        inner_cone_angle: f32,
        /// Outer cone angle in radians.
        outer_cone_angle: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightData {
    pub name: Option<String>,
    pub kind: LightKind,
    /// Linear RGB.
    pub color: [f32; 3],
    /// Candela for point/spot lights, lux for directional lights.
    pub intensity: f32,
    pub range: Option<f32>,
}

/// The closed set of things a node can carry.
#[derive(Debug, Clone, Default)]
pub enum NodeContent {
    #[default]
    None,
    Renderable(Renderable),
    Camera(CameraData),
    Light(LightData),
}

/// What the exporter consumes from a host scene graph.
pub trait SceneProvider {
    /// Host node handle. Cheap to copy; equality is node identity.
    type Node: Copy + Eq + Hash + Debug;

    /// Children in host order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    fn local_transform(&self, node: Self::Node) -> Transform;

    fn name(&self, _node: Self::Node) -> Option<String> {
        None
    }

    fn flags(&self, _node: Self::Node) -> NodeFlags {
        NodeFlags::default()
    }

    /// Stable identifier written to node extras for round-tripping host identity.
    fn external_id(&self, _node: Self::Node) -> Option<String> {
        None
    }

    fn try_get_renderable(&self, _node: Self::Node) -> Option<Renderable> {
        None
    }

    fn try_get_camera(&self, _node: Self::Node) -> Option<CameraData> {
        None
    }

    fn try_get_light(&self, _node: Self::Node) -> Option<LightData> {
        None
    }

    /// Resolve the node's content. Geometry wins over a camera, a camera over a light.
    fn content(&self, node: Self::Node) -> NodeContent {
        if let Some(renderable) = self.try_get_renderable(node) {
            NodeContent::Renderable(renderable)
        } else if let Some(camera) = self.try_get_camera(node) {
            NodeContent::Camera(camera)
        } else if let Some(light) = self.try_get_light(node) {
            NodeContent::Light(light)
        } else {
            NodeContent::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix_round_trip() {
        let t = Transform {
            translation: Vec3::new(1.0, -2.0, 3.5),
            rotation: Quat::from_rotation_y(0.7),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let back = Transform::from_matrix(&t.to_matrix());
        assert!(back.translation.abs_diff_eq(t.translation, 1e-5));
        assert!(back.rotation.abs_diff_eq(t.rotation, 1e-5));
        assert!(back.scale.abs_diff_eq(t.scale, 1e-5));
    }

    #[test]
    fn test_default_flags_are_exportable() {
        let flags = NodeFlags::default();
        assert!(flags.active);
        assert!(!flags.editor_only);
        assert_eq!(flags.layer, 0);
    }
}

//! Per-session document state.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use serde_json::{Map, Value, json};

use crate::buffer::{BufferPacker, PackedAttributes};
use crate::document::extensions::{GltfLight, GltfSpot, KHR_LIGHTS_PUNCTUAL, NodeExtensions, NodeLight};
use crate::document::{
    GltfCamera, GltfDocument, GltfMesh, GltfNode, GltfOrthographic, GltfPerspective,
    GltfPrimitive, LightsPunctual,
};
use crate::error::Result;
use crate::host::{
    CameraData, LightData, LightKind, MeshData, NodeContent, Projection, Renderable,
    SceneProvider, ShadingConfig, Topology, Transform,
};
use crate::log::{ExportLog, LogCode};
use crate::material::{EmitContext, MaterialKey, convert, default_material, emit_material};
use crate::registry::{ArcKey, ResourceRegistry};
use crate::settings::ExportSettings;
use crate::texture::{ImageEncoder, TextureRegistry};
use crate::walker::NodeSink;

/// Mesh identity plus the material chosen for each submesh.
type MeshKey = (ArcKey<MeshData>, Vec<Option<u32>>);

/// Packed streams of one host mesh, shared by all its material bindings.
struct PackedMesh {
    attributes: PackedAttributes,
    indices: Vec<u32>,
}

pub(crate) struct Session {
    pub(crate) settings: ExportSettings,
    pub(crate) doc: GltfDocument,
    pub(crate) packer: BufferPacker,
    pub(crate) extensions_used: IndexSet<&'static str>,
    pub(crate) log: ExportLog,
    materials: ResourceRegistry<MaterialKey>,
    meshes: ResourceRegistry<MeshKey>,
    packed: HashMap<ArcKey<MeshData>, PackedMesh>,
    textures: TextureRegistry,
    encoder: Box<dyn ImageEncoder>,
}

fn is_zero(v: [f32; 3]) -> bool {
    v == [0.0, 0.0, 0.0]
}

fn gltf_transform(node: &mut GltfNode, transform: &Transform) {
    let translation = transform.translation.to_array();
    let rotation = transform.rotation.to_array();
    let scale = transform.scale.to_array();
    node.translation = (!is_zero(translation)).then_some(translation);
    node.rotation = (rotation != [0.0, 0.0, 0.0, 1.0]).then_some(rotation);
    node.scale = (scale != [1.0, 1.0, 1.0]).then_some(scale);
}

impl Session {
    pub(crate) fn new(settings: ExportSettings, encoder: Box<dyn ImageEncoder>) -> Self {
        Self {
            doc: GltfDocument::new(settings.generator.clone()),
            settings,
            packer: BufferPacker::new(),
            extensions_used: IndexSet::new(),
            log: ExportLog::new(),
            materials: ResourceRegistry::new(),
            meshes: ResourceRegistry::new(),
            packed: HashMap::new(),
            textures: TextureRegistry::new(),
            encoder,
        }
    }

    pub(crate) fn set_encoder(&mut self, encoder: Box<dyn ImageEncoder>) {
        self.encoder = encoder;
    }

    fn register_material(&mut self, config: &Arc<ShadingConfig>) -> u32 {
        let key = MaterialKey::Config(ArcKey::new(config));
        if let Some(index) = self.materials.get(&key) {
            return index;
        }

        let converted = convert(config, &self.settings, &mut self.log);
        let mut ctx = EmitContext {
            textures: &mut self.textures,
            doc: &mut self.doc,
            packer: &mut self.packer,
            encoder: self.encoder.as_ref(),
            log: &mut self.log,
            extensions_used: &mut self.extensions_used,
            texture_transform: self.settings.texture_transform_extension,
        };
        let material = emit_material(&converted, &mut ctx);

        let index = self.materials.register(key).index();
        self.doc.materials.push(material);
        tracing::debug!(material = ?config.name, index, "registered material");
        index
    }

    fn default_material_index(&mut self, point_cloud: bool) -> u32 {
        let registration = self.materials.register(MaterialKey::Default { point_cloud });
        if registration.is_new() {
            let material = default_material(point_cloud);
            if let Some(ext) = &material.extensions {
                self.extensions_used.extend(ext.names());
            }
            self.doc.materials.push(material);
        }
        registration.index()
    }

    /// One material index (or none) per submesh, padding or truncating the slots.
    fn bind_materials(&mut self, renderable: &Renderable) -> Vec<Option<u32>> {
        let mesh = &renderable.mesh;
        let slots = mesh.submeshes.len();
        if renderable.materials.len() != slots {
            self.log.warn(
                LogCode::MaterialSlotMismatch,
                format!(
                    "mesh '{}': {} material slots for {} submeshes",
                    mesh.display_name(),
                    renderable.materials.len(),
                    slots
                ),
            );
        }

        (0..slots)
            .map(|i| match renderable.materials.get(i).and_then(Option::as_ref) {
                Some(config) => Some(self.register_material(config)),
                None if self.settings.default_material => {
                    let point_cloud = self.settings.point_cloud_support
                        && mesh.submeshes[i].topology == Topology::Points;
                    Some(self.default_material_index(point_cloud))
                }
                None => None,
            })
            .collect()
    }

    fn register_renderable(&mut self, renderable: &Renderable) -> Result<u32> {
        renderable.mesh.validate()?;
        let materials = self.bind_materials(renderable);
        let mesh_key = ArcKey::new(&renderable.mesh);

        let registration = self.meshes.register((mesh_key.clone(), materials.clone()));
        if !registration.is_new() {
            return Ok(registration.index());
        }

        let packer = &mut self.packer;
        let packed = self.packed.entry(mesh_key).or_insert_with(|| PackedMesh {
            attributes: packer.pack_attributes(&renderable.mesh),
            indices: packer.pack_submesh_indices(&renderable.mesh),
        });

        let primitives = renderable
            .mesh
            .submeshes
            .iter()
            .zip(&packed.indices)
            .zip(&materials)
            .map(|((submesh, &indices), &material)| GltfPrimitive {
                attributes: packed.attributes.attributes.clone(),
                indices: Some(indices),
                material,
                mode: (submesh.topology != Topology::Triangles).then_some(submesh.topology.gltf_mode()),
            })
            .collect();

        self.doc.meshes.push(GltfMesh {
            name: renderable.mesh.name.clone(),
            primitives,
        });
        tracing::debug!(mesh = ?renderable.mesh.name, index = registration.index(), "registered mesh");
        Ok(registration.index())
    }

    fn add_camera(&mut self, camera: &CameraData) -> u32 {
        let entry = match camera.projection {
            Projection::Perspective {
                yfov,
                aspect_ratio,
                znear,
                zfar,
            } => GltfCamera {
                name: camera.name.clone(),
                camera_type: "perspective".to_string(),
                perspective: Some(GltfPerspective {
                    yfov,
                    znear,
                    aspect_ratio,
                    zfar,
                }),
                orthographic: None,
            },
            Projection::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => GltfCamera {
                name: camera.name.clone(),
                camera_type: "orthographic".to_string(),
                perspective: None,
                orthographic: Some(GltfOrthographic {
                    xmag,
                    ymag,
                    znear,
                    zfar,
                }),
            },
        };
        let index = self.doc.cameras.len() as u32;
        self.doc.cameras.push(entry);
        index
    }

    fn add_light(&mut self, light: &LightData) -> u32 {
        let (light_type, spot) = match light.kind {
            LightKind::Directional => ("directional", None),
            LightKind::Point => ("point", None),
            LightKind::Spot {
                inner_cone_angle,
                outer_cone_angle,
            } => (
                "spot",
                Some(GltfSpot {
                    inner_cone_angle,
                    outer_cone_angle,
                }),
            ),
        };
        let lights = &mut self
            .doc
            .extensions
            .lights_punctual
            .get_or_insert_with(LightsPunctual::default)
            .lights;
        let index = lights.len() as u32;
        lights.push(GltfLight {
            name: light.name.clone(),
            light_type: light_type.to_string(),
            color: light.color,
            intensity: light.intensity,
            // Directional lights have no range.
            range: light.range.filter(|_| light_type != "directional"),
            spot,
        });
        self.extensions_used.insert(KHR_LIGHTS_PUNCTUAL);
        index
    }

    /// Nodes emitted so far.
    pub(crate) fn node_count(&self) -> usize {
        self.doc.nodes.len()
    }
}

impl<P: SceneProvider> NodeSink<P> for Session {
    fn emit_node(
        &mut self,
        provider: &P,
        node: P::Node,
        transform: Transform,
        children: Vec<u32>,
        with_content: bool,
    ) -> Option<u32> {
        let name = provider.name(node);
        let mut entry = GltfNode {
            name: name.clone(),
            children,
            ..GltfNode::default()
        };
        gltf_transform(&mut entry, &transform);

        let mut extras = Map::new();
        if let Some(id) = provider.external_id(node) {
            extras.insert("id".to_string(), Value::String(id));
        }

        let content = if with_content {
            provider.content(node)
        } else {
            NodeContent::None
        };
        match content {
            NodeContent::None => {}
            NodeContent::Renderable(renderable) => match self.register_renderable(&renderable) {
                Ok(mesh) => {
                    entry.mesh = Some(mesh);
                    extras.insert("castShadows".to_string(), json!(renderable.cast_shadows));
                    extras.insert("receiveShadows".to_string(), json!(renderable.receive_shadows));
                }
                Err(e) => {
                    self.log.error(
                        LogCode::InvalidMesh,
                        format!("node '{}' dropped: {e}", name.as_deref().unwrap_or("<unnamed>")),
                    );
                    return None;
                }
            },
            NodeContent::Camera(camera) => {
                if self.settings.export_cameras {
                    entry.camera = Some(self.add_camera(&camera));
                } else {
                    self.log.info(LogCode::ContentSkipped, "camera skipped by settings");
                }
            }
            NodeContent::Light(light) => {
                if self.settings.lights_enabled() {
                    entry.extensions = Some(NodeExtensions {
                        lights_punctual: NodeLight {
                            light: self.add_light(&light),
                        },
                    });
                } else {
                    self.log.info(LogCode::ContentSkipped, "light skipped by settings");
                }
            }
        }

        if !extras.is_empty() {
            entry.extras = Some(Value::Object(extras));
        }
        let index = self.doc.nodes.len() as u32;
        self.doc.nodes.push(entry);
        Some(index)
    }

    fn set_node_transform(&mut self, index: u32, transform: Transform) {
        if let Some(node) = self.doc.nodes.get_mut(index as usize) {
            gltf_transform(node, &transform);
        }
    }

    fn node_promoted(&mut self, provider: &P, node: P::Node, promoted: usize) {
        self.log.info(
            LogCode::NodePromoted,
            format!(
                "excluded node '{}': {promoted} descendant(s) promoted to scene roots",
                provider.name(node).as_deref().unwrap_or("<unnamed>")
            ),
        );
    }

    fn node_revisited(&mut self, provider: &P, node: P::Node) {
        self.log.warn(
            LogCode::NodeRevisited,
            format!(
                "node '{}' reached through more than one parent; exported once",
                provider.name(node).as_deref().unwrap_or("<unnamed>")
            ),
        );
    }
}

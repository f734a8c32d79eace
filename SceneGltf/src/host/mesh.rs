//! Host mesh data.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::error::{Error, Result};

/// Primitive topology of a submesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

impl Topology {
    /// glTF primitive `mode` value.
    #[must_use]
    pub const fn gltf_mode(self) -> u32 {
        match self {
            Self::Points => 0,
            Self::Lines => 1,
            Self::LineStrip => 3,
            Self::Triangles => 4,
            Self::TriangleStrip => 5,
        }
    }

    /// Index count a list must be a multiple of, for list topologies.
    #[must_use]
    pub const fn index_multiple(self) -> Option<usize> {
        match self {
            Self::Lines => Some(2),
            Self::Triangles => Some(3),
            Self::Points | Self::LineStrip | Self::TriangleStrip => None,
        }
    }
}

/// One index range drawn with one material.
#[derive(Debug, Clone, Default)]
pub struct SubMesh {
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl SubMesh {
    #[must_use]
    pub fn triangles(indices: Vec<u32>) -> Self {
        Self {
            indices,
            topology: Topology::Triangles,
        }
    }
}

/// Vertex streams shared by all submeshes.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub tangents: Option<Vec<[f32; 4]>>,
    /// One stream per UV channel (`TEXCOORD_0`, `TEXCOORD_1`, ...).
    pub uvs: Vec<Vec<[f32; 2]>>,
    pub colors: Option<Vec<[f32; 4]>>,
    pub submeshes: Vec<SubMesh>,
}

impl MeshData {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "<unnamed>".to_string())
    }

    /// Check stream lengths and index ranges.
    ///
    /// # Errors
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertex_count();
        if vertex_count == 0 {
            return Err(Error::MeshNoPositions {
                mesh: self.display_name(),
            });
        }
        if self.submeshes.is_empty() {
            return Err(Error::MeshNoSubmeshes {
                mesh: self.display_name(),
            });
        }

        let mut streams: Vec<(String, usize)> = Vec::new();
        if let Some(normals) = &self.normals {
            streams.push(("NORMAL".to_string(), normals.len()));
        }
        if let Some(tangents) = &self.tangents {
            streams.push(("TANGENT".to_string(), tangents.len()));
        }
        for (channel, uv) in self.uvs.iter().enumerate() {
            streams.push((format!("TEXCOORD_{channel}"), uv.len()));
        }
        if let Some(colors) = &self.colors {
            streams.push(("COLOR_0".to_string(), colors.len()));
        }
        for (attribute, found) in streams {
            if found != vertex_count {
                return Err(Error::MeshAttributeLength {
                    mesh: self.display_name(),
                    attribute,
                    expected: vertex_count,
                    found,
                });
            }
        }

        for (position, submesh) in self.submeshes.iter().enumerate() {
            if submesh.indices.is_empty() {
                return Err(Error::MeshEmptySubmesh {
                    mesh: self.display_name(),
                    submesh: position,
                });
            }
            let count = submesh.indices.len();
            if let Some(multiple) = submesh.topology.index_multiple().filter(|m| count % m != 0) {
                return Err(Error::MeshIndexCount {
                    mesh: self.display_name(),
                    submesh: position,
                    count,
                    multiple,
                });
            }
            if let Some(&index) = submesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::MeshIndexOutOfRange {
                    mesh: self.display_name(),
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData {
            name: Some("tri".into()),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            submeshes: vec![SubMesh::triangles(vec![0, 1, 2])],
            ..MeshData::default()
        }
    }

    #[test]
    fn test_valid_triangle() {
        assert!(triangle().validate().is_ok());
    }

    #[test]
    fn test_index_out_of_range() {
        let mut mesh = triangle();
        mesh.submeshes[0].indices[2] = 3;
        assert!(matches!(
            mesh.validate(),
            Err(Error::MeshIndexOutOfRange { index: 3, vertex_count: 3, .. })
        ));
    }

    #[test]
    fn test_attribute_length_mismatch() {
        let mut mesh = triangle();
        mesh.uvs = vec![vec![[0.0, 0.0]; 3], vec![[0.0, 0.0]; 2]];
        match mesh.validate() {
            Err(Error::MeshAttributeLength { attribute, found, .. }) => {
                assert_eq!(attribute, "TEXCOORD_1");
                assert_eq!(found, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_submesh_rejected() {
        let mut mesh = triangle();
        mesh.submeshes.push(SubMesh::triangles(Vec::new()));
        assert!(matches!(
            mesh.validate(),
            Err(Error::MeshEmptySubmesh { submesh: 1, .. })
        ));
    }

    #[test]
    fn test_partial_primitive_rejected() {
        let mut mesh = triangle();
        mesh.submeshes[0].indices.push(0);
        assert!(matches!(
            mesh.validate(),
            Err(Error::MeshIndexCount { count: 4, multiple: 3, .. })
        ));

        mesh.submeshes[0].topology = Topology::Lines;
        assert!(mesh.validate().is_ok());
        mesh.submeshes[0].topology = Topology::TriangleStrip;
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mesh = MeshData::default();
        assert!(matches!(mesh.validate(), Err(Error::MeshNoPositions { .. })));
    }
}

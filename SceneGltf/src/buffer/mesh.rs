//! Mesh stream packing for `BufferPacker`

use std::collections::BTreeMap;

use crate::host::MeshData;

use super::BufferPacker;

/// Attribute accessors shared by every primitive of one mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedAttributes {
    pub attributes: BTreeMap<String, u32>,
}

impl BufferPacker {
    /// Pack the vertex streams of `mesh`. The mesh must already be validated.
    pub fn pack_attributes(&mut self, mesh: &MeshData) -> PackedAttributes {
        let mut attributes = BTreeMap::new();
        attributes.insert("POSITION".to_string(), self.add_positions(&mesh.positions));
        if let Some(normals) = &mesh.normals {
            attributes.insert("NORMAL".to_string(), self.add_vec3(normals));
        }
        if let Some(tangents) = &mesh.tangents {
            attributes.insert("TANGENT".to_string(), self.add_vec4(tangents));
        }
        for (channel, uvs) in mesh.uvs.iter().enumerate() {
            attributes.insert(format!("TEXCOORD_{channel}"), self.add_texcoords(uvs));
        }
        if let Some(colors) = &mesh.colors {
            attributes.insert("COLOR_0".to_string(), self.add_vec4(colors));
        }
        PackedAttributes { attributes }
    }

    /// Pack one index accessor per submesh, in submesh order.
    pub fn pack_submesh_indices(&mut self, mesh: &MeshData) -> Vec<u32> {
        mesh.submeshes
            .iter()
            .map(|submesh| self.add_indices(&submesh.indices))
            .collect()
    }
}

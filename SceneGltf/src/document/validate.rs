//! Cross-reference validation for finished documents.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::error::{Error, Result};

use super::GltfDocument;

fn check(owner: impl FnOnce() -> String, kind: &'static str, index: u32, len: usize) -> Result<()> {
    if (index as usize) < len {
        Ok(())
    } else {
        Err(Error::DanglingReference {
            owner: owner(),
            kind,
            index,
            len,
        })
    }
}

impl GltfDocument {
    /// Check that every index refers to an existing entry, every buffer view
    /// fits its buffer, and nodes form a forest whose roots are the scene nodes.
    pub fn validate(&self) -> Result<()> {
        self.validate_scenes()?;
        self.validate_nodes()?;
        self.validate_meshes()?;
        self.validate_buffers()?;
        self.validate_materials()?;
        self.validate_hierarchy()
    }

    fn validate_scenes(&self) -> Result<()> {
        if let Some(scene) = self.scene {
            check(|| "document".to_string(), "scene", scene, self.scenes.len())?;
        }
        for (i, scene) in self.scenes.iter().enumerate() {
            for &node in &scene.nodes {
                check(|| format!("scene {i}"), "node", node, self.nodes.len())?;
            }
        }
        Ok(())
    }

    fn validate_nodes(&self) -> Result<()> {
        let lights = self.light_count();
        for (i, node) in self.nodes.iter().enumerate() {
            let owner = || format!("node {i}");
            if let Some(mesh) = node.mesh {
                check(owner, "mesh", mesh, self.meshes.len())?;
            }
            if let Some(camera) = node.camera {
                check(owner, "camera", camera, self.cameras.len())?;
            }
            if let Some(ext) = &node.extensions {
                check(owner, "light", ext.lights_punctual.light, lights)?;
            }
            for &child in &node.children {
                check(owner, "node", child, self.nodes.len())?;
            }
        }
        Ok(())
    }

    fn validate_meshes(&self) -> Result<()> {
        for (m, mesh) in self.meshes.iter().enumerate() {
            for (p, primitive) in mesh.primitives.iter().enumerate() {
                let owner = || format!("mesh {m} primitive {p}");
                for &accessor in primitive.attributes.values() {
                    check(owner, "accessor", accessor, self.accessors.len())?;
                }
                if let Some(indices) = primitive.indices {
                    check(owner, "accessor", indices, self.accessors.len())?;
                }
                if let Some(material) = primitive.material {
                    check(owner, "material", material, self.materials.len())?;
                }
            }
        }
        Ok(())
    }

    fn validate_buffers(&self) -> Result<()> {
        for (i, accessor) in self.accessors.iter().enumerate() {
            if accessor.count == 0 {
                return Err(Error::EmptyRange {
                    owner: format!("accessor {i}"),
                });
            }
            check(
                || format!("accessor {i}"),
                "bufferView",
                accessor.buffer_view,
                self.buffer_views.len(),
            )?;
        }
        for (i, view) in self.buffer_views.iter().enumerate() {
            if view.byte_length == 0 {
                return Err(Error::EmptyRange {
                    owner: format!("bufferView {i}"),
                });
            }
            check(|| format!("bufferView {i}"), "buffer", view.buffer, self.buffers.len())?;
            let len = self.buffers[view.buffer as usize].byte_length as usize;
            let end = view.byte_offset as usize + view.byte_length as usize;
            if end > len {
                return Err(Error::BufferViewOutOfRange {
                    view: i as u32,
                    buffer: view.buffer,
                    end,
                    len,
                });
            }
        }
        for (i, image) in self.images.iter().enumerate() {
            check(
                || format!("image {i}"),
                "bufferView",
                image.buffer_view,
                self.buffer_views.len(),
            )?;
        }
        Ok(())
    }

    fn validate_materials(&self) -> Result<()> {
        for (i, texture) in self.textures.iter().enumerate() {
            let owner = || format!("texture {i}");
            check(owner, "image", texture.source, self.images.len())?;
            if let Some(sampler) = texture.sampler {
                check(owner, "sampler", sampler, self.samplers.len())?;
            }
        }
        for (i, material) in self.materials.iter().enumerate() {
            for index in material.texture_indices() {
                check(|| format!("material {i}"), "texture", index, self.textures.len())?;
            }
        }
        Ok(())
    }

    fn validate_hierarchy(&self) -> Result<()> {
        let mut parent: Vec<Option<u32>> = vec![None; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child as usize == i {
                    return Err(Error::NodeHierarchy {
                        node: child,
                        message: "node lists itself as a child".to_string(),
                    });
                }
                if let Some(previous) = parent[child as usize] {
                    return Err(Error::NodeHierarchy {
                        node: child,
                        message: format!("has parents {previous} and {i}"),
                    });
                }
                parent[child as usize] = Some(i as u32);
            }
        }

        // With single parents, a cycle shows up as a parent chain longer than the node count.
        for start in 0..self.nodes.len() {
            let mut current = parent[start];
            let mut steps = 0;
            while let Some(p) = current {
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(Error::NodeHierarchy {
                        node: start as u32,
                        message: "node is its own ancestor".to_string(),
                    });
                }
                current = parent[p as usize];
            }
        }

        for scene in &self.scenes {
            for &root in &scene.nodes {
                if let Some(p) = parent[root as usize] {
                    return Err(Error::NodeHierarchy {
                        node: root,
                        message: format!("scene root is also a child of node {p}"),
                    });
                }
            }
        }
        Ok(())
    }
}

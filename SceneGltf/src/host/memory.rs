//! In-memory scene graph implementing [`SceneProvider`].
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use super::{
    CameraData, LightData, NodeContent, NodeFlags, Renderable, SceneProvider, Transform,
};

/// Index of a node inside a [`MemoryScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u32);

/// A node stored in a [`MemoryScene`].
#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    pub name: Option<String>,
    pub transform: Transform,
    pub flags: NodeFlags,
    pub external_id: Option<String>,
    pub content: NodeContent,
    children: Vec<NodeHandle>,
}

impl MemoryNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_renderable(mut self, renderable: Renderable) -> Self {
        self.content = NodeContent::Renderable(renderable);
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: CameraData) -> Self {
        self.content = NodeContent::Camera(camera);
        self
    }

    #[must_use]
    pub fn with_light(mut self, light: LightData) -> Self {
        self.content = NodeContent::Light(light);
        self
    }

    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Link an existing node as an additional child. The scene does not
    /// check for shared children or cycles; the exporter visits each node once.
    pub fn link_child(&mut self, child: NodeHandle) {
        self.children.push(child);
    }
}

/// Flat arena of nodes with parent→children links.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: Vec<MemoryNode>,
    roots: Vec<NodeHandle>,
}

impl MemoryScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, node: MemoryNode) -> NodeHandle {
        let handle = self.push(node);
        self.roots.push(handle);
        handle
    }

    /// # Panics
    /// Panics if `parent` does not belong to this scene.
    pub fn add_child(&mut self, parent: NodeHandle, node: MemoryNode) -> NodeHandle {
        let handle = self.push(node);
        self.nodes[parent.0 as usize].children.push(handle);
        handle
    }

    fn push(&mut self, node: MemoryNode) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(node);
        handle
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&MemoryNode> {
        self.nodes.get(handle.0 as usize)
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(handle.0 as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn get(&self, handle: NodeHandle) -> &MemoryNode {
        &self.nodes[handle.0 as usize]
    }
}

impl SceneProvider for MemoryScene {
    type Node = NodeHandle;

    fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.get(node).children.clone()
    }

    fn local_transform(&self, node: NodeHandle) -> Transform {
        self.get(node).transform
    }

    fn name(&self, node: NodeHandle) -> Option<String> {
        self.get(node).name.clone()
    }

    fn flags(&self, node: NodeHandle) -> NodeFlags {
        self.get(node).flags
    }

    fn external_id(&self, node: NodeHandle) -> Option<String> {
        self.get(node).external_id.clone()
    }

    fn content(&self, node: NodeHandle) -> NodeContent {
        self.get(node).content.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_keep_insertion_order() {
        let mut scene = MemoryScene::new();
        let root = scene.add_root(MemoryNode::new("root"));
        let a = scene.add_child(root, MemoryNode::new("a"));
        let b = scene.add_child(root, MemoryNode::new("b"));

        assert_eq!(scene.children(root), vec![a, b]);
        assert_eq!(scene.roots(), &[root]);
        assert_eq!(scene.name(b).as_deref(), Some("b"));
        assert!(matches!(scene.content(a), NodeContent::None));
    }
}

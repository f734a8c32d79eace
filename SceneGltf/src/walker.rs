//! Resumable depth-first scene walk.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! The walk keeps its own stack so it can stop after any completed node and
//! pick up again later. Children complete before their parent, so a parent's
//! document index is always allocated after its children's.
//!
//! Nodes excluded by flags are never emitted, but their subtrees are still
//! walked; emitted nodes below them become scene roots carrying their world
//! transform. A node whose content fails is dropped the same way.

use std::collections::{HashSet, VecDeque};

use glam::Mat4;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::host::{SceneProvider, Transform};
use crate::schedule::DeferAgent;
use crate::settings::ExportSettings;

/// Receives completed nodes from a [`SceneWalk`].
pub trait NodeSink<P: SceneProvider> {
    /// Emit `node` with already emitted `children`. `with_content` is false for
    /// grouping nodes kept only to hold descendants. Returns `None` if the node
    /// could not be emitted.
    fn emit_node(
        &mut self,
        provider: &P,
        node: P::Node,
        transform: Transform,
        children: Vec<u32>,
        with_content: bool,
    ) -> Option<u32>;

    /// Replace the transform of an emitted node that became a scene root.
    fn set_node_transform(&mut self, index: u32, transform: Transform);

    /// An excluded node whose emitted descendants were promoted to roots.
    fn node_promoted(&mut self, _provider: &P, _node: P::Node, _promoted: usize) {}

    /// `node` was reached a second time through another parent and skipped.
    fn node_revisited(&mut self, _provider: &P, _node: P::Node) {}
}

/// Result of a finished walk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalkResult {
    /// Scene root node indices, in completion order.
    pub roots: Vec<u32>,
    pub all_succeeded: bool,
}

/// Outcome of one [`SceneWalk::run`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkStatus {
    Suspended,
    Complete(WalkResult),
}

#[derive(Debug)]
struct Frame<N> {
    node: N,
    local: Transform,
    world: Mat4,
    walk_root: bool,
    excluded: bool,
    layer: u32,
    parent_emits: bool,
    children: Vec<N>,
    next_child: usize,
    emitted_children: Vec<(u32, Mat4)>,
    promoted: usize,
}

/// Walk state for one scene.
#[derive(Debug)]
pub struct SceneWalk<N> {
    pending_roots: VecDeque<N>,
    stack: Vec<Frame<N>>,
    visited: HashSet<N>,
    settings: ExportSettings,
    roots: Vec<u32>,
    all_succeeded: bool,
    completed: usize,
}

impl<N: Copy + Eq + std::hash::Hash> SceneWalk<N> {
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = N>, settings: &ExportSettings) -> Self {
        Self {
            pending_roots: roots.into_iter().collect(),
            stack: Vec::new(),
            visited: HashSet::new(),
            settings: settings.clone(),
            roots: Vec::new(),
            all_succeeded: true,
            completed: 0,
        }
    }

    /// Nodes completed so far (emitted or not).
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stack.is_empty() && self.pending_roots.is_empty()
    }

    fn push_frame<P>(&mut self, provider: &P, node: N, parent: Option<(Mat4, bool)>)
    where
        P: SceneProvider<Node = N>,
    {
        if !self.visited.insert(node) {
            return;
        }
        let flags = provider.flags(node);
        let local = provider.local_transform(node);
        let (world, parent_emits) = match parent {
            Some((parent_world, emits)) => (parent_world * local.to_matrix(), emits),
            None => (local.to_matrix(), false),
        };
        self.stack.push(Frame {
            node,
            local,
            world,
            walk_root: parent.is_none(),
            excluded: flags.editor_only || (!flags.active && !self.settings.include_inactive),
            layer: flags.layer,
            parent_emits,
            children: provider.children(node),
            next_child: 0,
            emitted_children: Vec::new(),
            promoted: 0,
        });
    }

    /// Complete the next node. Returns `false` once the walk is finished.
    pub fn advance<P, S>(&mut self, provider: &P, sink: &mut S) -> bool
    where
        P: SceneProvider<Node = N>,
        S: NodeSink<P>,
    {
        loop {
            let Some(top) = self.stack.last_mut() else {
                let Some(root) = self.pending_roots.pop_front() else {
                    return false;
                };
                if self.visited.contains(&root) {
                    sink.node_revisited(provider, root);
                } else {
                    self.push_frame(provider, root, None);
                }
                continue;
            };

            if let Some(&child) = top.children.get(top.next_child) {
                top.next_child += 1;
                let parent = (top.world, !top.excluded);
                if self.visited.contains(&child) {
                    sink.node_revisited(provider, child);
                } else {
                    self.push_frame(provider, child, Some(parent));
                }
                continue;
            }

            if let Some(frame) = self.stack.pop() {
                self.complete(provider, sink, frame);
                self.completed += 1;
            }
            return true;
        }
    }

    fn complete<P, S>(&mut self, provider: &P, sink: &mut S, frame: Frame<N>)
    where
        P: SceneProvider<Node = N>,
        S: NodeSink<P>,
    {
        if frame.excluded {
            if frame.promoted > 0 {
                sink.node_promoted(provider, frame.node, frame.promoted);
            }
            return;
        }

        let on_layer = self.settings.layer_included(frame.layer);
        if !on_layer && frame.emitted_children.is_empty() {
            return;
        }

        let transform = if frame.parent_emits || frame.walk_root {
            frame.local
        } else {
            Transform::from_matrix(&frame.world)
        };
        let children = frame.emitted_children.iter().map(|&(index, _)| index).collect();

        match sink.emit_node(provider, frame.node, transform, children, on_layer) {
            Some(index) => self.deliver(index, frame.world, frame.parent_emits),
            None => {
                self.all_succeeded = false;
                for &(child, world) in &frame.emitted_children {
                    sink.set_node_transform(child, Transform::from_matrix(&world));
                    self.roots.push(child);
                }
            }
        }
    }

    fn deliver(&mut self, index: u32, world: Mat4, parent_emits: bool) {
        match self.stack.last_mut() {
            Some(parent) if parent_emits => parent.emitted_children.push((index, world)),
            Some(parent) => {
                parent.promoted += 1;
                self.roots.push(index);
            }
            None => self.roots.push(index),
        }
    }

    /// Walk until finished, cancelled, or `agent` asks to yield.
    ///
    /// The agent is consulted only between nodes.
    pub fn run<P, S>(
        &mut self,
        provider: &P,
        sink: &mut S,
        agent: &mut dyn DeferAgent,
        token: &CancellationToken,
    ) -> Result<WalkStatus>
    where
        P: SceneProvider<Node = N>,
        S: NodeSink<P>,
    {
        token.check()?;
        while self.advance(provider, sink) {
            token.check()?;
            if self.is_finished() {
                break;
            }
            if agent.should_defer() {
                return Ok(WalkStatus::Suspended);
            }
        }
        Ok(WalkStatus::Complete(WalkResult {
            roots: std::mem::take(&mut self.roots),
            all_succeeded: self.all_succeeded,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryNode, MemoryScene, NodeFlags, NodeHandle};
    use crate::schedule::UninterruptedAgent;
    use glam::Vec3;

    /// Records emitted nodes; fails nodes named "bad".
    #[derive(Default)]
    struct Recorder {
        emitted: Vec<(String, Transform, Vec<u32>, bool)>,
        promoted: Vec<(String, usize)>,
    }

    impl NodeSink<MemoryScene> for Recorder {
        fn emit_node(
            &mut self,
            provider: &MemoryScene,
            node: NodeHandle,
            transform: Transform,
            children: Vec<u32>,
            with_content: bool,
        ) -> Option<u32> {
            let name = provider.name(node).unwrap_or_default();
            if name == "bad" {
                return None;
            }
            self.emitted.push((name, transform, children, with_content));
            Some(self.emitted.len() as u32 - 1)
        }

        fn set_node_transform(&mut self, index: u32, transform: Transform) {
            self.emitted[index as usize].1 = transform;
        }

        fn node_promoted(&mut self, provider: &MemoryScene, node: NodeHandle, promoted: usize) {
            self.promoted.push((provider.name(node).unwrap_or_default(), promoted));
        }
    }

    fn walk(scene: &MemoryScene, settings: &ExportSettings) -> (Recorder, WalkResult) {
        let mut sink = Recorder::default();
        let mut walk = SceneWalk::new(scene.roots().to_vec(), settings);
        let status = walk
            .run(scene, &mut sink, &mut UninterruptedAgent, &CancellationToken::new())
            .expect("walk succeeds");
        match status {
            WalkStatus::Complete(result) => (sink, result),
            WalkStatus::Suspended => panic!("uninterrupted walk suspended"),
        }
    }

    fn moved(name: &str, x: f32) -> MemoryNode {
        MemoryNode::new(name).with_transform(Transform::from_translation(Vec3::new(x, 0.0, 0.0)))
    }

    #[test]
    fn test_post_order_indices() {
        let mut scene = MemoryScene::new();
        let root = scene.add_root(MemoryNode::new("root"));
        let a = scene.add_child(root, MemoryNode::new("a"));
        scene.add_child(a, MemoryNode::new("a1"));
        scene.add_child(root, MemoryNode::new("b"));

        let (sink, result) = walk(&scene, &ExportSettings::default());
        let names: Vec<&str> = sink.emitted.iter().map(|e| e.0.as_str()).collect();
        assert_eq!(names, vec!["a1", "a", "b", "root"]);
        assert_eq!(sink.emitted[1].2, vec![0]);
        assert_eq!(sink.emitted[3].2, vec![1, 2]);
        assert_eq!(result.roots, vec![3]);
        assert!(result.all_succeeded);
    }

    #[test]
    fn test_excluded_node_promotes_children_with_world_transform() {
        let mut scene = MemoryScene::new();
        let root = scene.add_root(moved("root", 1.0));
        let hidden = scene.add_child(
            root,
            moved("hidden", 2.0).with_flags(NodeFlags {
                editor_only: true,
                ..NodeFlags::default()
            }),
        );
        scene.add_child(hidden, moved("leaf", 4.0));

        let (sink, result) = walk(&scene, &ExportSettings::default());
        let names: Vec<&str> = sink.emitted.iter().map(|e| e.0.as_str()).collect();
        assert_eq!(names, vec!["leaf", "root"]);
        assert!(sink.emitted[1].2.is_empty());
        assert_eq!(result.roots, vec![0, 1]);
        assert!(sink.emitted[0].1.translation.abs_diff_eq(Vec3::new(7.0, 0.0, 0.0), 1e-5));
        assert_eq!(sink.promoted, vec![("hidden".to_string(), 1)]);
    }

    #[test]
    fn test_inactive_included_on_request() {
        let mut scene = MemoryScene::new();
        scene.add_root(MemoryNode::new("off").with_flags(NodeFlags {
            active: false,
            ..NodeFlags::default()
        }));

        let (sink, _) = walk(&scene, &ExportSettings::default());
        assert!(sink.emitted.is_empty());
        let (sink, _) = walk(&scene, &ExportSettings::default().with_include_inactive(true));
        assert_eq!(sink.emitted.len(), 1);
    }

    #[test]
    fn test_off_layer_group_kept_without_content() {
        let mut scene = MemoryScene::new();
        let group = scene.add_root(MemoryNode::new("group").with_flags(NodeFlags {
            layer: 3,
            ..NodeFlags::default()
        }));
        scene.add_child(group, MemoryNode::new("child"));
        scene.add_root(MemoryNode::new("lonely").with_flags(NodeFlags {
            layer: 3,
            ..NodeFlags::default()
        }));

        let (sink, result) = walk(&scene, &ExportSettings::default().with_layer_mask(1));
        assert_eq!(sink.emitted.len(), 2);
        assert_eq!(sink.emitted[1].0, "group");
        assert!(!sink.emitted[1].3);
        assert!(sink.emitted[0].3);
        assert_eq!(result.roots, vec![1]);
    }

    #[test]
    fn test_failed_node_promotes_children() {
        let mut scene = MemoryScene::new();
        let bad = scene.add_root(moved("bad", 3.0));
        scene.add_child(bad, moved("kid", 1.0));

        let (sink, result) = walk(&scene, &ExportSettings::default());
        assert!(!result.all_succeeded);
        assert_eq!(result.roots, vec![0]);
        assert!(sink.emitted[0].1.translation.abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_shared_child_visited_once() {
        let mut scene = MemoryScene::new();
        let a = scene.add_root(MemoryNode::new("a"));
        let shared = scene.add_child(a, MemoryNode::new("shared"));
        let b = scene.add_root(MemoryNode::new("b"));
        if let Some(node) = scene.node_mut(b) {
            node.link_child(shared);
        }

        let (sink, result) = walk(&scene, &ExportSettings::default());
        assert_eq!(sink.emitted.len(), 3);
        assert_eq!(result.roots.len(), 2);
    }
}

//! Scene export sessions.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! A [`GltfExporter`] accumulates one glTF document from one or more scenes
//! and writes it once. Scene walks are time sliced: `add_scene` returns
//! [`SceneProgress::Suspended`] when the defer agent asks for a yield, and
//! `resume` continues where the walk stopped. Saving consumes the session;
//! afterwards every call fails with [`Error::WriterDisposed`].

mod save;
mod session;

use std::io::Write;
use std::path::Path;

use crate::cancel::CancellationToken;
use crate::document::GltfScene;
use crate::error::{Error, Result};
use crate::host::SceneProvider;
use crate::log::ExportLog;
use crate::schedule::{DeferAgent, UninterruptedAgent};
use crate::settings::ExportSettings;
use crate::texture::{ImageEncoder, PngImageEncoder};
use crate::walker::{SceneWalk, WalkStatus};

pub use save::ExportSummary;
use session::Session;

/// Result of a completed scene walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneReport {
    pub scene_index: u32,
    pub root_nodes: Vec<u32>,
    /// `false` if any node was dropped because its content was invalid.
    pub all_succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneProgress {
    /// The walk yielded; call [`GltfExporter::resume`].
    Suspended,
    Complete(SceneReport),
}

struct PendingScene<N> {
    name: String,
    walk: SceneWalk<N>,
}

enum ExporterState<N> {
    Building {
        session: Box<Session>,
        pending: Option<PendingScene<N>>,
    },
    Disposed,
}

/// Builds one glTF document from scenes of a [`SceneProvider`].
pub struct GltfExporter<'p, P: SceneProvider> {
    provider: &'p P,
    state: ExporterState<P::Node>,
    agent: Box<dyn DeferAgent + 'p>,
    cancel: CancellationToken,
    /// Log of a disposed session.
    final_log: ExportLog,
}

impl<'p, P: SceneProvider> GltfExporter<'p, P> {
    /// Start a session. Settings are validated up front.
    pub fn new(provider: &'p P, settings: ExportSettings) -> Result<Self> {
        settings.validate()?;
        tracing::info!(generator = %settings.generator, format = ?settings.format, "export session started");
        Ok(Self {
            provider,
            state: ExporterState::Building {
                session: Box::new(Session::new(settings, Box::new(PngImageEncoder))),
                pending: None,
            },
            agent: Box::new(UninterruptedAgent),
            cancel: CancellationToken::new(),
            final_log: ExportLog::new(),
        })
    }

    #[must_use]
    pub fn with_defer_agent(mut self, agent: impl DeferAgent + 'p) -> Self {
        self.agent = Box::new(agent);
        self
    }

    /// Token checked between nodes while walking scenes.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn with_image_encoder(mut self, encoder: impl ImageEncoder + 'static) -> Self {
        if let ExporterState::Building { session, .. } = &mut self.state {
            session.set_encoder(Box::new(encoder));
        }
        self
    }

    /// Diagnostics collected so far. Still available after disposal.
    #[must_use]
    pub fn log(&self) -> &ExportLog {
        match &self.state {
            ExporterState::Building { session, .. } => &session.log,
            ExporterState::Disposed => &self.final_log,
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        matches!(self.state, ExporterState::Disposed)
    }

    /// Nodes written to the document so far.
    #[must_use]
    pub fn emitted_nodes(&self) -> usize {
        match &self.state {
            ExporterState::Building { session, .. } => session.node_count(),
            ExporterState::Disposed => 0,
        }
    }

    fn dispose(&mut self) -> Option<Box<Session>> {
        match std::mem::replace(&mut self.state, ExporterState::Disposed) {
            ExporterState::Building { session, .. } => {
                self.final_log = session.log.clone();
                Some(session)
            }
            ExporterState::Disposed => None,
        }
    }

    /// Begin walking a scene rooted at `roots`.
    pub fn add_scene(
        &mut self,
        roots: impl IntoIterator<Item = P::Node>,
        name: impl Into<String>,
    ) -> Result<SceneProgress> {
        let name = name.into();
        match &mut self.state {
            ExporterState::Disposed => return Err(Error::WriterDisposed),
            ExporterState::Building {
                pending: Some(scene),
                ..
            } => {
                return Err(Error::SceneInProgress {
                    name: scene.name.clone(),
                });
            }
            ExporterState::Building { session, pending } => {
                tracing::info!(scene = %name, "walking scene");
                *pending = Some(PendingScene {
                    walk: SceneWalk::new(roots, &session.settings),
                    name,
                });
            }
        }
        self.drive()
    }

    /// Continue a suspended scene walk.
    pub fn resume(&mut self) -> Result<SceneProgress> {
        match &self.state {
            ExporterState::Disposed => Err(Error::WriterDisposed),
            ExporterState::Building { pending: None, .. } => Err(Error::NoSceneInProgress),
            ExporterState::Building { .. } => self.drive(),
        }
    }

    /// Walk a whole scene without yielding to the caller.
    pub fn add_scene_blocking(
        &mut self,
        roots: impl IntoIterator<Item = P::Node>,
        name: impl Into<String>,
    ) -> Result<SceneReport> {
        let mut progress = self.add_scene(roots, name)?;
        loop {
            match progress {
                SceneProgress::Complete(report) => return Ok(report),
                SceneProgress::Suspended => progress = self.resume()?,
            }
        }
    }

    fn drive(&mut self) -> Result<SceneProgress> {
        let ExporterState::Building { session, pending } = &mut self.state else {
            return Err(Error::WriterDisposed);
        };
        let Some(scene) = pending.as_mut() else {
            return Err(Error::NoSceneInProgress);
        };

        self.agent.begin_quantum();
        let status = scene
            .walk
            .run(self.provider, session.as_mut(), self.agent.as_mut(), &self.cancel);

        match status {
            Ok(WalkStatus::Suspended) => {
                tracing::debug!(scene = %scene.name, completed = scene.walk.completed(), "walk suspended");
                Ok(SceneProgress::Suspended)
            }
            Ok(WalkStatus::Complete(result)) => {
                let name = scene.name.clone();
                *pending = None;
                let scene_index = session.doc.scenes.len() as u32;
                session.doc.scenes.push(GltfScene {
                    name: Some(name.clone()),
                    nodes: result.roots.clone(),
                });
                tracing::info!(
                    scene = %name,
                    roots = result.roots.len(),
                    all_succeeded = result.all_succeeded,
                    "scene complete"
                );
                Ok(SceneProgress::Complete(SceneReport {
                    scene_index,
                    root_nodes: result.roots,
                    all_succeeded: result.all_succeeded,
                }))
            }
            Err(e) => {
                tracing::warn!("export aborted: {e}");
                self.dispose();
                Err(e)
            }
        }
    }

    fn take_for_save(&mut self) -> Result<Box<Session>> {
        let in_progress = match &self.state {
            ExporterState::Disposed => return Err(Error::WriterDisposed),
            ExporterState::Building { pending, .. } => pending.as_ref().map(|s| s.name.clone()),
        };
        let session = self.dispose().ok_or(Error::WriterDisposed)?;
        match in_progress {
            Some(name) => Err(Error::SceneInProgress { name }),
            None => Ok(session),
        }
    }

    /// Serialize and write the document to `path`. Disposes the exporter.
    ///
    /// Output goes through temporary files in the destination directory;
    /// nothing is left at `path` unless the save completes.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>, token: &CancellationToken) -> Result<ExportSummary> {
        let session = self.take_for_save()?;
        let path = path.as_ref();
        let result = save::save_to_file(*session, path, token);
        match &result {
            Ok(summary) => tracing::info!(path = %path.display(), bytes = summary.bytes_written, "export written"),
            Err(e) => tracing::warn!(path = %path.display(), "export failed: {e}"),
        }
        result
    }

    /// Serialize and write the document to `writer`. Disposes the exporter.
    ///
    /// No bytes are written if the token is cancelled before writing starts.
    pub fn save_to_stream<W: Write>(&mut self, writer: W, token: &CancellationToken) -> Result<ExportSummary> {
        let session = self.take_for_save()?;
        save::save_to_stream(*session, writer, token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::host::{MemoryNode, MemoryScene, MeshData, Renderable, ShadingConfig, SubMesh};

    fn triangle() -> Arc<MeshData> {
        Arc::new(MeshData {
            name: Some("tri".into()),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            submeshes: vec![SubMesh::triangles(vec![0, 1, 2])],
            ..MeshData::default()
        })
    }

    #[test]
    fn test_shared_mesh_and_material_deduplicated() {
        let mesh = triangle();
        let material = Arc::new(ShadingConfig::named("m"));
        let mut scene = MemoryScene::new();
        let root = scene.add_root(MemoryNode::new("root"));
        for i in 0..5 {
            scene.add_child(
                root,
                MemoryNode::new(format!("n{i}"))
                    .with_renderable(Renderable::new(Arc::clone(&mesh), vec![Some(Arc::clone(&material))])),
            );
        }

        let mut exporter = GltfExporter::new(&scene, ExportSettings::default()).expect("settings");
        let report = exporter
            .add_scene_blocking(scene.roots().to_vec(), "Scene")
            .expect("walk");
        assert!(report.all_succeeded);

        let mut out = Vec::new();
        let summary = exporter
            .save_to_stream(&mut out, &CancellationToken::new())
            .expect("save");
        assert_eq!(summary.meshes, 1);
        assert_eq!(summary.materials, 1);
        assert_eq!(summary.nodes, 6);
        assert_eq!(&out[..4], b"glTF");
    }

    #[test]
    fn test_material_slot_padding_distinguishes_bindings() {
        let mesh = Arc::new(MeshData {
            submeshes: vec![SubMesh::triangles(vec![0, 1, 2]), SubMesh::triangles(vec![2, 1, 0])],
            ..(*triangle()).clone()
        });
        let material = Arc::new(ShadingConfig::named("m"));
        let mut scene = MemoryScene::new();
        scene.add_root(
            MemoryNode::new("a").with_renderable(Renderable::new(Arc::clone(&mesh), vec![Some(Arc::clone(&material))])),
        );
        scene.add_root(MemoryNode::new("b").with_renderable(Renderable::new(
            Arc::clone(&mesh),
            vec![Some(Arc::clone(&material)), Some(Arc::clone(&material)), None],
        )));

        let mut exporter = GltfExporter::new(&scene, ExportSettings::default()).expect("settings");
        exporter.add_scene_blocking(scene.roots().to_vec(), "Scene").expect("walk");
        assert_eq!(
            exporter
                .log()
                .entries()
                .iter()
                .filter(|e| e.code == crate::log::LogCode::MaterialSlotMismatch)
                .count(),
            2
        );

        let mut out = Vec::new();
        let summary = exporter.save_to_stream(&mut out, &CancellationToken::new()).expect("save");
        // Same geometry, two bindings: [m, none] and [m, m].
        assert_eq!(summary.meshes, 2);
    }

    #[test]
    fn test_scene_in_progress_rejected() {
        let mut scene = MemoryScene::new();
        let root = scene.add_root(MemoryNode::new("root"));
        scene.add_child(root, MemoryNode::new("child"));

        struct AlwaysDefer;
        impl DeferAgent for AlwaysDefer {
            fn begin_quantum(&mut self) {}
            fn should_defer(&mut self) -> bool {
                true
            }
        }

        let mut exporter = GltfExporter::new(&scene, ExportSettings::default())
            .expect("settings")
            .with_defer_agent(AlwaysDefer);
        assert_eq!(exporter.add_scene(vec![root], "A").expect("starts"), SceneProgress::Suspended);
        assert!(matches!(exporter.add_scene(vec![root], "B"), Err(Error::SceneInProgress { .. })));
        assert!(matches!(exporter.resume(), Ok(SceneProgress::Complete(_))));
        assert!(matches!(exporter.resume(), Err(Error::NoSceneInProgress)));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let scene = MemoryScene::new();
        let result = GltfExporter::new(&scene, ExportSettings::default().with_layer_mask(0));
        assert!(matches!(result, Err(Error::SettingsInvalid { .. })));
    }

    #[test]
    fn test_empty_submesh_drops_node() {
        let broken = Arc::new(MeshData {
            submeshes: vec![SubMesh::triangles(vec![0, 1, 2]), SubMesh::triangles(Vec::new())],
            ..(*triangle()).clone()
        });
        let mut scene = MemoryScene::new();
        let root = scene.add_root(MemoryNode::new("root"));
        scene.add_child(root, MemoryNode::new("good").with_renderable(Renderable::new(triangle(), vec![None])));
        scene.add_child(root, MemoryNode::new("broken").with_renderable(Renderable::new(broken, vec![None, None])));

        let mut exporter = GltfExporter::new(&scene, ExportSettings::default()).expect("settings");
        let report = exporter
            .add_scene_blocking(scene.roots().to_vec(), "Scene")
            .expect("walk");
        assert!(!report.all_succeeded);
        assert!(exporter.log().has_code(crate::log::LogCode::InvalidMesh));

        let mut out = Vec::new();
        let summary = exporter.save_to_stream(&mut out, &CancellationToken::new()).expect("save");
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.meshes, 1);
    }
}

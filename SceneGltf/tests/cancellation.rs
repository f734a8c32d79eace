//! Cancellation and disposal leave no partial output behind.

use std::sync::Arc;

use scenegltf::host::NodeFlags;
use scenegltf::prelude::*;
use tempfile::tempdir;

fn triangle_scene() -> MemoryScene {
    let mesh = Arc::new(MeshData {
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        submeshes: vec![SubMesh::triangles(vec![0, 1, 2])],
        ..MeshData::default()
    });
    let mut scene = MemoryScene::new();
    let root = scene.add_root(MemoryNode::new("root"));
    scene.add_child(
        root,
        MemoryNode::new("tri").with_renderable(Renderable::new(mesh, vec![None])),
    );
    scene
}

fn walked(scene: &MemoryScene, settings: ExportSettings) -> GltfExporter<'_, MemoryScene> {
    let mut exporter = GltfExporter::new(scene, settings).expect("settings");
    exporter
        .add_scene_blocking(scene.roots().to_vec(), "Scene")
        .expect("walk");
    exporter
}

fn dir_is_empty(path: &std::path::Path) -> bool {
    std::fs::read_dir(path).expect("read dir").next().is_none()
}

#[test]
fn test_cancelled_file_save_writes_nothing() {
    let scene = triangle_scene();
    let dir = tempdir().expect("tempdir");
    let token = CancellationToken::new();
    token.cancel();

    let mut exporter = walked(&scene, ExportSettings::default());
    let result = exporter.save_to_file(dir.path().join("out.glb"), &token);
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(dir_is_empty(dir.path()));
    assert!(exporter.is_disposed());
}

#[test]
fn test_cancelled_gltf_save_writes_neither_file() {
    let scene = triangle_scene();
    let dir = tempdir().expect("tempdir");
    let token = CancellationToken::new();
    token.cancel();

    let settings = ExportSettings::default().with_format(ExportFormat::Json);
    let mut exporter = walked(&scene, settings);
    let result = exporter.save_to_file(dir.path().join("out.gltf"), &token);
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(dir_is_empty(dir.path()));
}

#[test]
fn test_cancelled_stream_save_writes_no_bytes() {
    let scene = triangle_scene();
    let token = CancellationToken::new();
    token.cancel();

    let mut exporter = walked(&scene, ExportSettings::default());
    let mut out = Vec::new();
    let result = exporter.save_to_stream(&mut out, &token);
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(out.is_empty());
}

#[test]
fn test_cancel_during_walk_disposes_exporter() {
    let scene = triangle_scene();
    let token = CancellationToken::new();
    token.cancel();

    let mut exporter = GltfExporter::new(&scene, ExportSettings::default())
        .expect("settings")
        .with_cancellation(token);
    let result = exporter.add_scene(scene.roots().to_vec(), "Scene");
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(exporter.is_disposed());
    assert!(matches!(exporter.resume(), Err(Error::WriterDisposed)));
    assert!(matches!(
        exporter.add_scene(scene.roots().to_vec(), "Again"),
        Err(Error::WriterDisposed)
    ));
}

#[test]
fn test_every_call_after_save_is_disposed() {
    let scene = triangle_scene();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("out.glb");

    let mut exporter = walked(&scene, ExportSettings::default());
    exporter
        .save_to_file(&path, &CancellationToken::new())
        .expect("save");
    assert!(path.exists());

    let token = CancellationToken::new();
    assert!(matches!(
        exporter.add_scene(scene.roots().to_vec(), "Scene"),
        Err(Error::WriterDisposed)
    ));
    assert!(matches!(exporter.save_to_file(&path, &token), Err(Error::WriterDisposed)));
    assert!(matches!(
        exporter.save_to_stream(Vec::new(), &token),
        Err(Error::WriterDisposed)
    ));
    // Diagnostics outlive the session.
    assert!(exporter.log().is_empty());
}

#[test]
fn test_save_with_scene_in_progress_fails_and_disposes() {
    struct Yield;
    impl DeferAgent for Yield {
        fn begin_quantum(&mut self) {}
        fn should_defer(&mut self) -> bool {
            true
        }
    }

    let scene = triangle_scene();
    let dir = tempdir().expect("tempdir");
    let mut exporter = GltfExporter::new(&scene, ExportSettings::default())
        .expect("settings")
        .with_defer_agent(Yield);
    assert_eq!(
        exporter.add_scene(scene.roots().to_vec(), "Scene").expect("walk"),
        SceneProgress::Suspended
    );

    let result = exporter.save_to_file(dir.path().join("out.glb"), &CancellationToken::new());
    assert!(matches!(result, Err(Error::SceneInProgress { .. })));
    assert!(exporter.is_disposed());
    assert!(dir_is_empty(dir.path()));
}

#[test]
fn test_editor_only_root_yields_empty_scene() {
    let mut scene = MemoryScene::new();
    scene.add_root(MemoryNode::new("gizmo").with_flags(NodeFlags {
        editor_only: true,
        ..NodeFlags::default()
    }));
    let mut exporter = walked(&scene, ExportSettings::default());
    let mut out = Vec::new();
    let summary = exporter
        .save_to_stream(&mut out, &CancellationToken::new())
        .expect("save");
    assert_eq!(summary.nodes, 0);
    assert_eq!(summary.scenes, 1);
}

#[test]
fn test_failed_buffer_write_leaves_no_gltf() {
    let scene = triangle_scene();
    let dir = tempdir().expect("tempdir");
    // A directory in the way makes the buffer file impossible to place.
    std::fs::create_dir(dir.path().join("out.bin")).expect("blocker");

    let settings = ExportSettings::default().with_format(ExportFormat::Json);
    let mut exporter = walked(&scene, settings);
    let result = exporter.save_to_file(dir.path().join("out.gltf"), &CancellationToken::new());
    assert!(matches!(result, Err(Error::PersistFailed { .. })));
    assert!(!dir.path().join("out.gltf").exists());
    assert!(dir.path().join("out.bin").is_dir());
    assert!(exporter.is_disposed());
}

#[test]
fn test_failed_gltf_write_removes_buffer() {
    let scene = triangle_scene();
    let dir = tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("out.gltf")).expect("blocker");

    let settings = ExportSettings::default().with_format(ExportFormat::Json);
    let mut exporter = walked(&scene, settings);
    let result = exporter.save_to_file(dir.path().join("out.gltf"), &CancellationToken::new());
    assert!(matches!(result, Err(Error::PersistFailed { .. })));
    assert!(!dir.path().join("out.bin").exists());
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(std::result::Result::ok)
        .map(|e| e.file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("out.gltf")]);
}

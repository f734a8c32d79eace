//! Export, read back with the `gltf` crate, compare.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Quat, Vec3};
use pretty_assertions::assert_eq;
use scenegltf::import::{ImportedAlphaMode, import_slice};
use scenegltf::prelude::*;
use scenegltf::settings::BufferLocation;
use tempfile::tempdir;

const MATERIALS: usize = 3;
const MESHES: usize = 3;
const DEPTH: u32 = 4;

fn quad(name: &str, z: f32) -> Arc<MeshData> {
    Arc::new(MeshData {
        name: Some(name.to_string()),
        positions: vec![[0.0, 0.0, z], [1.0, 0.0, z], [1.0, 1.0, z], [0.0, 1.0, z]],
        normals: Some(vec![[0.0, 0.0, 1.0]; 4]),
        uvs: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]],
        submeshes: vec![SubMesh::triangles(vec![0, 1, 2, 0, 2, 3])],
        ..MeshData::default()
    })
}

fn materials() -> Vec<Arc<ShadingConfig>> {
    let opaque = ShadingConfig::named("opaque");
    let mut mask_default = ShadingConfig::named("mask-default");
    mask_default.alpha.mask_threshold = Some(0.5);
    let mut mask_custom = ShadingConfig::named("mask-custom");
    mask_custom.alpha.mask_threshold = Some(0.3);
    vec![Arc::new(opaque), Arc::new(mask_default), Arc::new(mask_custom)]
}

fn transform_for(i: usize) -> Transform {
    Transform {
        translation: Vec3::new(i as f32, 0.5, -1.0),
        rotation: Quat::from_rotation_y(0.1 * i as f32),
        scale: if i % 2 == 0 { Vec3::ONE } else { Vec3::splat(2.0) },
    }
}

struct Fixture {
    scene: MemoryScene,
    transforms: HashMap<String, Transform>,
    children: HashMap<String, Vec<String>>,
}

fn grow(
    fixture: &mut Fixture,
    meshes: &[Arc<MeshData>],
    materials: &[Arc<ShadingConfig>],
    parent: Option<NodeHandle>,
    depth: u32,
    counter: &mut usize,
) -> String {
    let i = *counter;
    *counter += 1;
    let name = format!("n{i}");
    let mesh = &meshes[i % MESHES];
    let material = &materials[(i % MESHES) % MATERIALS];
    let node = MemoryNode::new(name.clone())
        .with_transform(transform_for(i))
        .with_renderable(Renderable::new(Arc::clone(mesh), vec![Some(Arc::clone(material))]));
    let handle = match parent {
        Some(parent) => fixture.scene.add_child(parent, node),
        None => fixture.scene.add_root(node),
    };
    fixture.transforms.insert(name.clone(), transform_for(i));

    let mut kids = Vec::new();
    if depth > 1 {
        for _ in 0..2 {
            kids.push(grow(fixture, meshes, materials, Some(handle), depth - 1, counter));
        }
    }
    fixture.children.insert(name.clone(), kids);
    name
}

fn fixture() -> Fixture {
    let meshes: Vec<_> = (0..MESHES).map(|m| quad(&format!("mesh{m}"), m as f32)).collect();
    let materials = materials();
    let mut fixture = Fixture {
        scene: MemoryScene::new(),
        transforms: HashMap::new(),
        children: HashMap::new(),
    };
    let mut counter = 0;
    grow(&mut fixture, &meshes, &materials, None, DEPTH, &mut counter);
    fixture
}

fn export_glb(scene: &MemoryScene) -> Vec<u8> {
    let mut exporter = GltfExporter::new(scene, ExportSettings::default()).expect("settings");
    let report = exporter
        .add_scene_blocking(scene.roots().to_vec(), "Scene")
        .expect("walk");
    assert!(report.all_succeeded);
    let mut out = Vec::new();
    exporter
        .save_to_stream(&mut out, &CancellationToken::new())
        .expect("save");
    out
}

#[test]
fn test_structure_survives_round_trip() {
    let fixture = fixture();
    let imported = import_slice(&export_glb(&fixture.scene)).expect("import");

    let node_count = (1 << DEPTH) - 1;
    assert_eq!(imported.nodes.len(), node_count);
    assert_eq!(imported.materials.len(), MATERIALS);
    assert_eq!(imported.mesh_primitives, vec![1; MESHES]);
    assert_eq!(imported.scenes.len(), 1);
    assert_eq!(imported.scenes[0].len(), 1);

    let names: Vec<String> = imported
        .nodes
        .iter()
        .map(|n| n.name.clone().expect("named"))
        .collect();
    for node in &imported.nodes {
        let name = node.name.as_deref().expect("named");
        let expected = &fixture.transforms[name];
        let translation = Vec3::from_array(node.translation);
        let rotation = Quat::from_array(node.rotation);
        let scale = Vec3::from_array(node.scale);
        assert!(translation.abs_diff_eq(expected.translation, 1e-5), "{name} translation");
        assert!(rotation.abs_diff_eq(expected.rotation, 1e-5), "{name} rotation");
        assert!(scale.abs_diff_eq(expected.scale, 1e-5), "{name} scale");

        let children: Vec<String> = node.children.iter().map(|&c| names[c].clone()).collect();
        assert_eq!(children, fixture.children[name], "{name} children");
    }
}

#[test]
fn test_alpha_cutoff_written_only_when_not_default() {
    let fixture = fixture();
    let imported = import_slice(&export_glb(&fixture.scene)).expect("import");

    let by_name: HashMap<_, _> = imported
        .materials
        .iter()
        .map(|m| (m.name.clone().expect("named"), m))
        .collect();
    assert_eq!(by_name["opaque"].alpha_mode, ImportedAlphaMode::Opaque);
    assert_eq!(by_name["mask-default"].alpha_mode, ImportedAlphaMode::Mask);
    assert_eq!(by_name["mask-default"].alpha_cutoff, None);
    assert_eq!(by_name["mask-custom"].alpha_mode, ImportedAlphaMode::Mask);
    let cutoff = by_name["mask-custom"].alpha_cutoff.expect("explicit cutoff");
    assert!((cutoff - 0.3).abs() < 1e-6);
}

#[test]
fn test_loose_gltf_with_sibling_buffer_loads() {
    let fixture = fixture();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tree.gltf");

    let settings = ExportSettings::default().with_format(ExportFormat::Json);
    let mut exporter = GltfExporter::new(&fixture.scene, settings).expect("settings");
    exporter
        .add_scene_blocking(fixture.scene.roots().to_vec(), "Scene")
        .expect("walk");
    let summary = exporter
        .save_to_file(&path, &CancellationToken::new())
        .expect("save");
    assert_eq!(summary.files, vec![path.clone(), dir.path().join("tree.bin")]);

    let (document, buffers, _) = gltf::import(&path).expect("gltf import");
    assert_eq!(buffers.len(), 1);
    let mesh = document.meshes().next().expect("mesh");
    let primitive = mesh.primitives().next().expect("primitive");
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let positions: Vec<[f32; 3]> = reader.read_positions().expect("positions").collect();
    assert_eq!(positions.len(), 4);
    let indices: Vec<u32> = reader.read_indices().expect("indices").into_u32().collect();
    assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_data_uri_gltf_is_single_file() {
    let fixture = fixture();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tree.gltf");

    let settings = ExportSettings::default()
        .with_format(ExportFormat::Json)
        .with_buffer_location(BufferLocation::DataUri);
    let mut exporter = GltfExporter::new(&fixture.scene, settings).expect("settings");
    exporter
        .add_scene_blocking(fixture.scene.roots().to_vec(), "Scene")
        .expect("walk");
    let summary = exporter
        .save_to_file(&path, &CancellationToken::new())
        .expect("save");
    assert_eq!(summary.files, vec![path.clone()]);
    assert!(!dir.path().join("tree.bin").exists());

    let (_, buffers, _) = gltf::import(&path).expect("gltf import");
    assert_eq!(buffers.len(), 1);
}

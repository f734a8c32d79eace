//! Random hierarchies with exclusion flags always produce valid documents
//! that preserve world transforms.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use proptest::prelude::*;
use scenegltf::import::{ImportedScene, import_slice};
use scenegltf::prelude::*;

#[derive(Debug, Clone)]
struct NodeSpec {
    parent_pick: u32,
    active: bool,
    editor_only: bool,
    layer: u32,
    translation: [f32; 3],
    angle: f32,
    scale: f32,
}

fn node_spec() -> impl Strategy<Value = NodeSpec> {
    (
        any::<u32>(),
        prop::bool::weighted(0.8),
        prop::bool::weighted(0.1),
        0u32..2,
        prop::array::uniform3(-5.0f32..5.0),
        -3.0f32..3.0,
        0.8f32..1.25,
    )
        .prop_map(|(parent_pick, active, editor_only, layer, translation, angle, scale)| NodeSpec {
            parent_pick,
            active,
            editor_only,
            layer,
            translation,
            angle,
            scale,
        })
}

fn parent_of(i: usize, spec: &NodeSpec) -> Option<usize> {
    (i > 0 && spec.parent_pick % 4 != 0).then(|| spec.parent_pick as usize % i)
}

fn transform(spec: &NodeSpec) -> Transform {
    Transform {
        translation: Vec3::from_array(spec.translation),
        rotation: Quat::from_rotation_z(spec.angle) * Quat::from_rotation_x(spec.angle * 0.5),
        scale: Vec3::splat(spec.scale),
    }
}

fn build(specs: &[NodeSpec]) -> MemoryScene {
    let mut scene = MemoryScene::new();
    let mut handles = Vec::new();
    for (i, spec) in specs.iter().enumerate() {
        let node = MemoryNode::new(format!("n{i}"))
            .with_transform(transform(spec))
            .with_flags(NodeFlags {
                active: spec.active,
                editor_only: spec.editor_only,
                layer: spec.layer,
            });
        let handle = match parent_of(i, spec) {
            Some(p) => scene.add_child(handles[p], node),
            None => scene.add_root(node),
        };
        handles.push(handle);
    }
    scene
}

/// Which host nodes should reach the document with layer mask `0b01`.
fn expected_emitted(specs: &[NodeSpec]) -> Vec<bool> {
    let mut emitted = vec![false; specs.len()];
    // Children always have larger indices than their parent.
    for i in (0..specs.len()).rev() {
        let spec = &specs[i];
        let excluded = spec.editor_only || !spec.active;
        let has_emitted_child = (i + 1..specs.len())
            .any(|c| parent_of(c, &specs[c]) == Some(i) && emitted[c]);
        emitted[i] = !excluded && (spec.layer == 0 || has_emitted_child);
    }
    emitted
}

fn host_world(specs: &[NodeSpec], i: usize) -> Mat4 {
    let local = transform(&specs[i]).to_matrix();
    match parent_of(i, &specs[i]) {
        Some(p) => host_world(specs, p) * local,
        None => local,
    }
}

fn imported_world(scene: &ImportedScene, parents: &HashMap<usize, usize>, i: usize) -> Mat4 {
    let node = &scene.nodes[i];
    let local = Mat4::from_scale_rotation_translation(
        Vec3::from_array(node.scale),
        Quat::from_array(node.rotation),
        Vec3::from_array(node.translation),
    );
    match parents.get(&i) {
        Some(&p) => imported_world(scene, parents, p) * local,
        None => local,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exclusion_keeps_document_valid(specs in prop::collection::vec(node_spec(), 1..24)) {
        let scene = build(&specs);
        let settings = ExportSettings::default().with_layer_mask(0b01);
        let mut exporter = GltfExporter::new(&scene, settings).expect("settings");
        let report = exporter
            .add_scene_blocking(scene.roots().to_vec(), "Scene")
            .expect("walk");
        prop_assert!(report.all_succeeded);

        let mut out = Vec::new();
        exporter
            .save_to_stream(&mut out, &CancellationToken::new())
            .expect("save validates the document");
        let imported = import_slice(&out).expect("gltf crate accepts the document");

        let expected = expected_emitted(&specs);
        prop_assert_eq!(imported.nodes.len(), expected.iter().filter(|&&e| e).count());

        // Every node is referenced exactly once: as a scene root or as one child.
        let mut parents = HashMap::new();
        for (index, node) in imported.nodes.iter().enumerate() {
            for &child in &node.children {
                prop_assert!(parents.insert(child, index).is_none(), "node {} has two parents", child);
            }
        }
        for &root in &imported.scenes[0] {
            prop_assert!(!parents.contains_key(&root), "root {} is also a child", root);
        }
        prop_assert_eq!(parents.len() + imported.scenes[0].len(), imported.nodes.len());

        for (index, node) in imported.nodes.iter().enumerate() {
            let name = node.name.as_deref().expect("named");
            let host: usize = name[1..].parse().expect("numeric suffix");
            prop_assert!(expected[host], "{} should not be emitted", name);
            let want = host_world(&specs, host);
            let got = imported_world(&imported, &parents, index);
            let magnitude = want.to_cols_array().iter().fold(1.0f32, |m, v| m.max(v.abs()));
            prop_assert!(got.abs_diff_eq(want, 1e-3 * magnitude), "{} world transform drifted", name);
        }
    }
}

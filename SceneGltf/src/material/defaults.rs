//! Generated material for empty material slots.

use crate::document::extensions::{MaterialExtensions, MaterialsUnlit};
use crate::document::{GltfMaterial, GltfPbrMetallicRoughness};

/// Default material: unlit double-sided white for point rendering, a
/// neutral dielectric otherwise.
#[must_use]
pub fn default_material(point_cloud_support: bool) -> GltfMaterial {
    if point_cloud_support {
        GltfMaterial {
            name: Some("Default-PointCloud".to_string()),
            pbr_metallic_roughness: Some(GltfPbrMetallicRoughness {
                base_color_factor: Some([1.0, 1.0, 1.0, 1.0]),
                metallic_factor: Some(0.0),
                roughness_factor: Some(0.9),
                ..GltfPbrMetallicRoughness::default()
            }),
            double_sided: Some(true),
            extensions: Some(MaterialExtensions {
                unlit: Some(MaterialsUnlit {}),
                ..MaterialExtensions::default()
            }),
            ..GltfMaterial::default()
        }
    } else {
        GltfMaterial {
            name: Some("Default".to_string()),
            pbr_metallic_roughness: Some(GltfPbrMetallicRoughness {
                base_color_factor: Some([1.0, 1.0, 1.0, 1.0]),
                metallic_factor: Some(0.0),
                roughness_factor: Some(0.5),
                ..GltfPbrMetallicRoughness::default()
            }),
            ..GltfMaterial::default()
        }
    }
}

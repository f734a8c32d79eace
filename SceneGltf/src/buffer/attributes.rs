//! Typed stream methods for `BufferPacker`

use crate::document::{
    COMPONENT_FLOAT, COMPONENT_UNSIGNED_INT, COMPONENT_UNSIGNED_SHORT, GltfAccessor,
    TARGET_ARRAY_BUFFER, TARGET_ELEMENT_ARRAY_BUFFER,
};

use super::BufferPacker;

impl BufferPacker {
    fn push_accessor(
        &mut self,
        buffer_view: u32,
        component_type: u32,
        count: usize,
        accessor_type: &str,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> u32 {
        let (min, max) = bounds.unzip();
        let index = self.accessors.len() as u32;
        self.accessors.push(GltfAccessor {
            buffer_view,
            byte_offset: None,
            component_type,
            count: count as u32,
            accessor_type: accessor_type.to_string(),
            min,
            max,
            normalized: None,
        });
        index
    }

    pub(crate) fn add_positions(&mut self, positions: &[[f32; 3]]) -> u32 {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for pos in positions {
            for i in 0..3 {
                min[i] = min[i].min(pos[i]);
                max[i] = max[i].max(pos[i]);
            }
        }

        let view = self.push_view(bytemuck::cast_slice(positions), Some(TARGET_ARRAY_BUFFER));
        self.push_accessor(
            view,
            COMPONENT_FLOAT,
            positions.len(),
            "VEC3",
            Some((min.to_vec(), max.to_vec())),
        )
    }

    pub(crate) fn add_vec3(&mut self, values: &[[f32; 3]]) -> u32 {
        let view = self.push_view(bytemuck::cast_slice(values), Some(TARGET_ARRAY_BUFFER));
        self.push_accessor(view, COMPONENT_FLOAT, values.len(), "VEC3", None)
    }

    pub(crate) fn add_vec4(&mut self, values: &[[f32; 4]]) -> u32 {
        let view = self.push_view(bytemuck::cast_slice(values), Some(TARGET_ARRAY_BUFFER));
        self.push_accessor(view, COMPONENT_FLOAT, values.len(), "VEC4", None)
    }

    pub(crate) fn add_texcoords(&mut self, uvs: &[[f32; 2]]) -> u32 {
        let view = self.push_view(bytemuck::cast_slice(uvs), Some(TARGET_ARRAY_BUFFER));
        self.push_accessor(view, COMPONENT_FLOAT, uvs.len(), "VEC2", None)
    }

    /// Index stream, narrowed to u16 when every index fits.
    pub(crate) fn add_indices(&mut self, indices: &[u32]) -> u32 {
        let (view, component_type) = if indices.iter().all(|&i| i <= u32::from(u16::MAX)) {
            let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            (
                self.push_view(bytemuck::cast_slice(&narrow), Some(TARGET_ELEMENT_ARRAY_BUFFER)),
                COMPONENT_UNSIGNED_SHORT,
            )
        } else {
            (
                self.push_view(bytemuck::cast_slice(indices), Some(TARGET_ELEMENT_ARRAY_BUFFER)),
                COMPONENT_UNSIGNED_INT,
            )
        };
        self.push_accessor(view, component_type, indices.len(), "SCALAR", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_bounds() {
        let mut packer = BufferPacker::new();
        let accessor = packer.add_positions(&[[0.0, -1.0, 2.0], [3.0, 4.0, -5.0]]);
        let acc = &packer.accessors[accessor as usize];
        assert_eq!(acc.min.as_deref(), Some(&[0.0, -1.0, -5.0][..]));
        assert_eq!(acc.max.as_deref(), Some(&[3.0, 4.0, 2.0][..]));
        assert_eq!(acc.count, 2);
        assert_eq!(packer.buffer_views[0].byte_length, 24);
    }

    #[test]
    fn test_index_width_selection() {
        let mut packer = BufferPacker::new();
        let small = packer.add_indices(&[0, 1, 65535]);
        let large = packer.add_indices(&[0, 1, 65536]);
        assert_eq!(packer.accessors[small as usize].component_type, COMPONENT_UNSIGNED_SHORT);
        assert_eq!(packer.accessors[large as usize].component_type, COMPONENT_UNSIGNED_INT);
        assert_eq!(packer.buffer_views[0].byte_length, 6);
        assert_eq!(packer.buffer_views[1].byte_offset, 8);
        assert_eq!(packer.buffer_views[1].byte_length, 12);
    }

    #[test]
    fn test_little_endian_floats() {
        let mut packer = BufferPacker::new();
        packer.add_texcoords(&[[1.0, 0.5]]);
        assert_eq!(&packer.data[..4], &1.0f32.to_le_bytes());
        assert_eq!(&packer.data[4..8], &0.5f32.to_le_bytes());
    }
}

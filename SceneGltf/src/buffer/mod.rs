//! Binary buffer packing.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! All streams of a session go into one growable buffer. Every stream starts
//! on a 4-byte boundary (zero padded) and gets its own buffer view.

mod attributes;
mod mesh;

use crate::document::{GltfAccessor, GltfBuffer, GltfBufferView};

pub use mesh::PackedAttributes;

/// Buffer, buffer views and accessors under construction.
#[derive(Debug, Default)]
pub struct BufferPacker {
    pub(crate) data: Vec<u8>,
    pub(crate) buffer_views: Vec<GltfBufferView>,
    pub(crate) accessors: Vec<GltfAccessor>,
}

/// Finished buffer contents ready to move into a document.
#[derive(Debug)]
pub struct PackedBuffer {
    pub buffer_views: Vec<GltfBufferView>,
    pub accessors: Vec<GltfAccessor>,
    /// Buffer bytes, padded to a multiple of 4.
    pub data: Vec<u8>,
}

impl PackedBuffer {
    /// The single buffer entry, or `None` when nothing was packed.
    #[must_use]
    pub fn buffer_entry(&self, uri: Option<String>) -> Option<GltfBuffer> {
        (!self.data.is_empty()).then(|| GltfBuffer {
            byte_length: self.data.len() as u32,
            uri,
        })
    }
}

impl BufferPacker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn align(&mut self, alignment: usize) {
        let padding = (alignment - (self.data.len() % alignment)) % alignment;
        self.data.extend(std::iter::repeat_n(0u8, padding));
    }

    /// Append `bytes` as a new buffer view. Returns the view index.
    pub(crate) fn push_view(&mut self, bytes: &[u8], target: Option<u32>) -> u32 {
        self.align(4);
        let byte_offset = self.data.len() as u32;
        self.data.extend_from_slice(bytes);

        let view = self.buffer_views.len() as u32;
        self.buffer_views.push(GltfBufferView {
            buffer: 0,
            byte_offset,
            byte_length: bytes.len() as u32,
            target,
        });
        view
    }

    /// Append an encoded image as an untargeted buffer view.
    pub fn add_image_bytes(&mut self, bytes: &[u8]) -> u32 {
        self.push_view(bytes, None)
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pad the buffer to 4 bytes and hand over its contents.
    #[must_use]
    pub fn finish(mut self) -> PackedBuffer {
        self.align(4);
        PackedBuffer {
            buffer_views: self.buffer_views,
            accessors: self.accessors,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_start_aligned() {
        let mut packer = BufferPacker::new();
        packer.push_view(&[1, 2, 3], None);
        let second = packer.push_view(&[4], None);
        assert_eq!(packer.buffer_views[second as usize].byte_offset, 4);
        assert_eq!(&packer.data[..5], &[1, 2, 3, 0, 4]);

        let packed = packer.finish();
        assert_eq!(packed.data.len(), 8);
        assert_eq!(packed.buffer_entry(None).map(|b| b.byte_length), Some(8));
    }

    #[test]
    fn test_empty_packer_has_no_buffer() {
        let packed = BufferPacker::new().finish();
        assert!(packed.buffer_entry(None).is_none());
    }
}

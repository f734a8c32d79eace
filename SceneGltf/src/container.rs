//! GLB binary container.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Layout: 12-byte header (`glTF`, version 2, total length), a JSON chunk
//! padded with spaces, then an optional BIN chunk padded with zeros. Every
//! chunk length is a multiple of 4.

use std::io::{self, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

pub const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
pub const GLB_VERSION: u32 = 2;
pub const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
pub const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

fn padded_len(len: usize) -> usize {
    len + (4 - len % 4) % 4
}

/// Total container size for the given chunk payloads.
#[must_use]
pub fn glb_len(json_len: usize, bin_len: Option<usize>) -> usize {
    HEADER_LEN
        + CHUNK_HEADER_LEN
        + padded_len(json_len)
        + bin_len.map_or(0, |len| CHUNK_HEADER_LEN + padded_len(len))
}

fn write_chunk<W: Write>(writer: &mut W, chunk_type: u32, data: &[u8], pad: u8) -> io::Result<()> {
    let padding = padded_len(data.len()) - data.len();
    writer.write_u32::<LittleEndian>((data.len() + padding) as u32)?;
    writer.write_u32::<LittleEndian>(chunk_type)?;
    writer.write_all(data)?;
    writer.write_all(&[pad; 3][..padding])?;
    Ok(())
}

/// Write a complete GLB container. `bin` is omitted when `None` or empty.
pub fn write_glb<W: Write>(writer: &mut W, json: &[u8], bin: Option<&[u8]>) -> io::Result<()> {
    let bin = bin.filter(|b| !b.is_empty());
    let total = glb_len(json.len(), bin.map(<[u8]>::len));

    writer.write_u32::<LittleEndian>(GLB_MAGIC)?;
    writer.write_u32::<LittleEndian>(GLB_VERSION)?;
    writer.write_u32::<LittleEndian>(total as u32)?;

    write_chunk(writer, CHUNK_JSON, json, b' ')?;
    if let Some(bin) = bin {
        write_chunk(writer, CHUNK_BIN, bin, 0)?;
    }
    Ok(())
}

/// Build a GLB container in memory.
pub fn glb_bytes(json: &[u8], bin: Option<&[u8]>) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(glb_len(json.len(), bin.map(<[u8]>::len)));
    write_glb(&mut out, json, bin).map(|()| out)
}

/// Chunk layout of a GLB file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlbInfo {
    pub version: u32,
    pub total_len: u32,
    pub json_len: u32,
    pub bin_len: Option<u32>,
}

/// Read the header and chunk table of a GLB file.
pub fn read_glb_info(bytes: &[u8]) -> Result<GlbInfo> {
    let invalid = |message: &str| Error::Io(io::Error::new(io::ErrorKind::InvalidData, message.to_string()));

    let mut cursor = io::Cursor::new(bytes);
    if cursor.read_u32::<LittleEndian>()? != GLB_MAGIC {
        return Err(invalid("not a GLB file"));
    }
    let version = cursor.read_u32::<LittleEndian>()?;
    let total_len = cursor.read_u32::<LittleEndian>()?;
    if total_len as usize > bytes.len() {
        return Err(invalid("GLB truncated"));
    }

    let json_len = cursor.read_u32::<LittleEndian>()?;
    if cursor.read_u32::<LittleEndian>()? != CHUNK_JSON {
        return Err(invalid("first GLB chunk is not JSON"));
    }

    let bin_offset = HEADER_LEN + CHUNK_HEADER_LEN + json_len as usize;
    let bin_len = if bin_offset + CHUNK_HEADER_LEN <= total_len as usize {
        cursor.set_position(bin_offset as u64);
        let len = cursor.read_u32::<LittleEndian>()?;
        (cursor.read_u32::<LittleEndian>()? == CHUNK_BIN).then_some(len)
    } else {
        None
    };

    Ok(GlbInfo {
        version,
        total_len,
        json_len,
        bin_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_and_padding() {
        let glb = glb_bytes(b"{}", Some(&[1u8, 2, 3, 4, 5][..])).expect("in memory");
        assert_eq!(&glb[..4], b"glTF");
        assert_eq!(glb.len(), 12 + 8 + 4 + 8 + 8);
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        assert_eq!(&glb[20..24], b"{}  ");
        assert_eq!(&glb[24..28], &8u32.to_le_bytes());
        assert_eq!(&glb[28..32], b"BIN\0");
        assert_eq!(&glb[32..40], &[1, 2, 3, 4, 5, 0, 0, 0]);
    }

    #[test]
    fn test_no_bin_chunk_when_empty() {
        let glb = glb_bytes(b"{\"a\":1}", Some(&[][..])).expect("in memory");
        let info = read_glb_info(&glb).expect("valid");
        assert_eq!(info.version, 2);
        assert_eq!(info.json_len, 8);
        assert_eq!(info.bin_len, None);
        assert_eq!(info.total_len as usize, glb.len());
    }

    #[test]
    fn test_reject_non_glb() {
        assert!(read_glb_info(b"{\"asset\":{}}").is_err());
    }
}

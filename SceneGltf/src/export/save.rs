//! Finalizing a session into GLB or loose glTF output.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tempfile::NamedTempFile;

use crate::cancel::CancellationToken;
use crate::container;
use crate::document::GltfDocument;
use crate::error::{Error, Result};
use crate::settings::{BufferLocation, ExportFormat};

use super::session::Session;

/// Where the buffer of a finished document lives.
enum BufferTarget {
    /// GLB BIN chunk
    Embedded,
    /// `uri` relative to the `.gltf`
    Sibling(String),
    /// Base64 data URI
    DataUri,
}

/// What a successful save produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Files written, main file first.
    pub files: Vec<PathBuf>,
    /// Bytes written across all outputs.
    pub bytes_written: usize,
    pub scenes: usize,
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
    pub warnings: usize,
}

fn summarize(doc: &GltfDocument, session_warnings: usize) -> ExportSummary {
    ExportSummary {
        files: Vec::new(),
        bytes_written: 0,
        scenes: doc.scenes.len(),
        nodes: doc.nodes.len(),
        meshes: doc.meshes.len(),
        materials: doc.materials.len(),
        textures: doc.textures.len(),
        warnings: session_warnings,
    }
}

/// Move packed buffers and extension names into the document, then validate it.
fn assemble(session: Session, target: &BufferTarget) -> Result<(GltfDocument, Vec<u8>, usize)> {
    let warnings = session.log.warnings().count();
    let mut doc = session.doc;
    let packed = session.packer.finish();

    let uri = match target {
        BufferTarget::Embedded => None,
        BufferTarget::Sibling(name) => Some(name.clone()),
        BufferTarget::DataUri => Some(format!(
            "data:application/octet-stream;base64,{}",
            STANDARD.encode(&packed.data)
        )),
    };
    if let Some(buffer) = packed.buffer_entry(uri) {
        doc.buffers.push(buffer);
    }
    doc.buffer_views = packed.buffer_views;
    doc.accessors = packed.accessors;
    doc.extensions_used = session
        .extensions_used
        .into_iter()
        .map(str::to_string)
        .collect();
    if !doc.scenes.is_empty() {
        doc.scene = Some(0);
    }
    doc.validate()?;
    Ok((doc, packed.data, warnings))
}

fn temp_in(dir: &Path) -> Result<NamedTempFile> {
    Ok(NamedTempFile::new_in(dir)?)
}

fn persist(file: NamedTempFile, path: &Path) -> Result<()> {
    file.persist(path).map_err(|e| Error::PersistFailed {
        path: path.to_path_buf(),
        message: e.error.to_string(),
    })?;
    Ok(())
}

/// Write `session` to `path` through temporary files that are persisted only
/// when every output is complete.
pub(super) fn save_to_file(session: Session, path: &Path, token: &CancellationToken) -> Result<ExportSummary> {
    token.check()?;
    let format = session.settings.format;
    let location = session.settings.buffer_location;
    let pretty = session.settings.pretty_json;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    match format {
        ExportFormat::Binary => {
            let (doc, bin, warnings) = assemble(session, &BufferTarget::Embedded)?;
            let json = doc.to_json(false)?;
            let mut summary = summarize(&doc, warnings);

            token.check()?;
            let mut file = temp_in(&dir)?;
            container::write_glb(&mut file, &json, Some(&bin))?;
            file.flush()?;
            token.check()?;
            persist(file, path)?;

            summary.bytes_written = container::glb_len(json.len(), (!bin.is_empty()).then_some(bin.len()));
            summary.files.push(path.to_path_buf());
            Ok(summary)
        }
        ExportFormat::Json => {
            let target = match location {
                BufferLocation::SiblingFile => {
                    let stem = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .ok_or_else(|| Error::InvalidOutputPath(path.to_path_buf()))?;
                    BufferTarget::Sibling(format!("{stem}.bin"))
                }
                BufferLocation::DataUri => BufferTarget::DataUri,
            };
            let (doc, bin, warnings) = assemble(session, &target)?;
            let json = doc.to_json(pretty)?;
            let mut summary = summarize(&doc, warnings);

            token.check()?;
            let mut gltf_file = temp_in(&dir)?;
            gltf_file.write_all(&json)?;
            gltf_file.flush()?;
            summary.bytes_written = json.len();

            let sibling = match &target {
                BufferTarget::Sibling(name) if !bin.is_empty() => {
                    let mut bin_file = temp_in(&dir)?;
                    bin_file.write_all(&bin)?;
                    bin_file.flush()?;
                    summary.bytes_written += bin.len();
                    Some((bin_file, path.with_file_name(name)))
                }
                _ => None,
            };

            token.check()?;
            // The .gltf appears last, once the buffer it references exists.
            let bin_path = match sibling {
                Some((bin_file, bin_path)) => {
                    persist(bin_file, &bin_path)?;
                    Some(bin_path)
                }
                None => None,
            };
            if let Err(e) = persist(gltf_file, path) {
                if let Some(bin_path) = &bin_path {
                    if let Err(cleanup) = std::fs::remove_file(bin_path) {
                        tracing::warn!("could not remove {}: {cleanup}", bin_path.display());
                    }
                }
                return Err(e);
            }
            summary.files.push(path.to_path_buf());
            summary.files.extend(bin_path);
            Ok(summary)
        }
    }
}

/// Write `session` to `writer`. JSON output embeds the buffer as a data URI
/// since a stream has no sibling file. The whole output is built before the
/// first byte is written.
pub(super) fn save_to_stream<W: Write>(
    session: Session,
    mut writer: W,
    token: &CancellationToken,
) -> Result<ExportSummary> {
    token.check()?;
    let bytes = match session.settings.format {
        ExportFormat::Binary => {
            let (doc, bin, warnings) = assemble(session, &BufferTarget::Embedded)?;
            let json = doc.to_json(false)?;
            (container::glb_bytes(&json, Some(&bin))?, summarize(&doc, warnings))
        }
        ExportFormat::Json => {
            let pretty = session.settings.pretty_json;
            let (doc, _, warnings) = assemble(session, &BufferTarget::DataUri)?;
            (doc.to_json(pretty)?, summarize(&doc, warnings))
        }
    };
    let (bytes, mut summary) = bytes;

    token.check()?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    summary.bytes_written = bytes.len();
    Ok(summary)
}

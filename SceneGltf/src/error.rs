//! Error types for `SceneGltf`
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `SceneGltf` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file or stream operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A temporary output file could not be moved into place.
    #[error("failed to persist output file {path}: {message}")]
    PersistFailed {
        /// The destination path.
        path: PathBuf,
        /// The underlying error message.
        message: String,
    },

    // ==================== Export Session Errors ====================
    /// The exporter was used after it was finalized or after a fatal error.
    #[error("writer disposed: the export session has already been finalized")]
    WriterDisposed,

    /// The export session was cancelled through its cancellation token.
    #[error("export cancelled")]
    Cancelled,

    /// A scene is still being walked; finish it with `resume()` first.
    #[error("scene '{name}' is still in progress")]
    SceneInProgress {
        /// Name of the scene being walked.
        name: String,
    },

    /// `resume()` was called without a scene in progress.
    #[error("no scene in progress")]
    NoSceneInProgress,

    /// The output path has no usable file stem.
    #[error("invalid output path: {0}")]
    InvalidOutputPath(PathBuf),

    // ==================== Mesh Data Errors ====================
    /// The mesh has no vertex positions.
    #[error("mesh '{mesh}' has no vertex positions")]
    MeshNoPositions {
        /// Mesh name (or `<unnamed>`).
        mesh: String,
    },

    /// The mesh has no submeshes.
    #[error("mesh '{mesh}' has no submeshes")]
    MeshNoSubmeshes {
        /// Mesh name (or `<unnamed>`).
        mesh: String,
    },

    /// A vertex attribute stream length does not match the vertex count.
    #[error("mesh '{mesh}': attribute {attribute} has {found} elements, expected {expected}")]
    MeshAttributeLength {
        /// Mesh name (or `<unnamed>`).
        mesh: String,
        /// glTF attribute semantic.
        attribute: String,
        /// Vertex count.
        expected: usize,
        /// Stream length.
        found: usize,
    },

    /// An index refers past the end of the vertex streams.
    #[error("mesh '{mesh}': index {index} out of range ({vertex_count} vertices)")]
    MeshIndexOutOfRange {
        /// Mesh name (or `<unnamed>`).
        mesh: String,
        /// The offending index.
        index: u32,
        /// Vertex count.
        vertex_count: usize,
    },

    /// A submesh has no indices.
    #[error("mesh '{mesh}': submesh {submesh} has no indices")]
    MeshEmptySubmesh {
        /// Mesh name (or `<unnamed>`).
        mesh: String,
        /// Submesh position.
        submesh: usize,
    },

    /// The index count cannot form whole primitives of the submesh topology.
    #[error("mesh '{mesh}': submesh {submesh} has {count} indices, not a multiple of {multiple}")]
    MeshIndexCount {
        /// Mesh name (or `<unnamed>`).
        mesh: String,
        /// Submesh position.
        submesh: usize,
        /// Number of indices.
        count: usize,
        /// Indices per primitive.
        multiple: usize,
    },

    // ==================== Document Errors ====================
    /// A document cross-reference points past the end of its target list.
    #[error("{owner} references {kind} {index}, but only {len} exist")]
    DanglingReference {
        /// Description of the referencing entry, e.g. `node 3`.
        owner: String,
        /// Kind of the referenced entry, e.g. `mesh`.
        kind: &'static str,
        /// The referenced index.
        index: u32,
        /// Length of the referenced list.
        len: usize,
    },

    /// A node is reachable from itself or has more than one parent.
    #[error("node {node} breaks the tree structure: {message}")]
    NodeHierarchy {
        /// The node index.
        node: u32,
        /// What is wrong.
        message: String,
    },

    /// An accessor or buffer view covers no elements.
    #[error("{owner} is empty")]
    EmptyRange {
        /// The accessor or buffer view.
        owner: String,
    },

    /// A buffer view extends past the end of its buffer.
    #[error("buffer view {view} spans {end} bytes but buffer {buffer} has {len}")]
    BufferViewOutOfRange {
        /// The buffer view index.
        view: u32,
        /// The buffer index.
        buffer: u32,
        /// End offset of the view.
        end: usize,
        /// Length of the buffer.
        len: usize,
    },

    /// Failed to serialize glTF JSON.
    #[error("glTF JSON serialization failed: {message}")]
    GltfSerializationFailed {
        /// The serialization error message.
        message: String,
    },

    // ==================== Texture Errors ====================
    /// Raw pixel data does not match the declared dimensions.
    #[error("texture pixels: expected {expected} bytes for {width}x{height} RGBA8, found {found}")]
    TexturePixelSize {
        /// Texture width.
        width: u32,
        /// Texture height.
        height: u32,
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        found: usize,
    },

    /// Failed to encode PNG image.
    #[error("failed to encode PNG: {message}")]
    PngEncodeFailed {
        /// The encoding error message.
        message: String,
    },

    // ==================== Import Errors ====================
    /// Failed to load or parse a glTF file.
    #[error("failed to load glTF: {0}")]
    GltfLoadFailed(#[from] gltf::Error),

    // ==================== Configuration Errors ====================
    /// Export settings failed validation.
    #[error("invalid export settings: {message}")]
    SettingsInvalid {
        /// The validation error message.
        message: String,
    },

    /// Settings file could not be parsed.
    #[error("settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// Scene description could not be interpreted.
    #[error("invalid scene description: {message}")]
    SceneDescriptionInvalid {
        /// Description of the problem.
        message: String,
    },

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for `SceneGltf` operations.
pub type Result<T> = std::result::Result<T, Error>;

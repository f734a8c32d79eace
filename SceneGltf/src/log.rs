//! Export diagnostics collected during a session.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Recoverable problems (fallback conversions, dropped textures, slot
//! mismatches, skipped nodes) never abort an export. They are recorded here
//! and mirrored to `tracing` so both callers and log subscribers see them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// What kind of event a log entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCode {
    /// A shading feature had no direct glTF equivalent and was approximated.
    MaterialFallback,
    /// Transmission was folded into base color alpha.
    TransmissionFolded,
    /// A texture transform was dropped because the extension is disabled.
    TextureTransformDropped,
    /// A texture could not be encoded and was left out.
    TextureFailed,
    /// Material slot count did not match the submesh count.
    MaterialSlotMismatch,
    /// A node's mesh data was invalid; the node was dropped.
    InvalidMesh,
    /// A node was excluded and its children were promoted to scene roots.
    NodePromoted,
    /// A node was reached through a second parent and skipped.
    NodeRevisited,
    /// Camera or light content skipped by settings.
    ContentSkipped,
}

impl fmt::Display for LogCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MaterialFallback => "material-fallback",
            Self::TransmissionFolded => "transmission-folded",
            Self::TextureTransformDropped => "texture-transform-dropped",
            Self::TextureFailed => "texture-failed",
            Self::MaterialSlotMismatch => "material-slot-mismatch",
            Self::InvalidMesh => "invalid-mesh",
            Self::NodePromoted => "node-promoted",
            Self::NodeRevisited => "node-revisited",
            Self::ContentSkipped => "content-skipped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub code: LogCode,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Ordered list of diagnostics for one export session.
#[derive(Debug, Clone, Default)]
pub struct ExportLog {
    entries: Vec<LogEntry>,
}

impl ExportLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, code: LogCode, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%code, "{message}");
        self.push(LogLevel::Info, code, message);
    }

    pub fn warn(&mut self, code: LogCode, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%code, "{message}");
        self.push(LogLevel::Warning, code, message);
    }

    pub fn error(&mut self, code: LogCode, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(%code, "{message}");
        self.push(LogLevel::Error, code, message);
    }

    fn push(&mut self, level: LogLevel, code: LogCode, message: String) {
        self.entries.push(LogEntry {
            level,
            code,
            message,
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries at warning level or above.
    pub fn warnings(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.level >= LogLevel::Warning)
    }

    #[must_use]
    pub fn has_code(&self, code: LogCode) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

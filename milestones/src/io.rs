//! Read and write the registry file.
//!
//! The file is a JSON object keyed by milestone number, written with
//! 4-space indentation and one array element per line so that diffs of
//! `milestones.json` stay minimal. Non-ASCII text is written as `\uXXXX`
//! escapes, matching files produced by Python's `json.dump(indent=4)`.
//! Writes go through a temp file + fsync + rename, so a failed or
//! interrupted write leaves the previous file intact.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};

use crate::registry::MilestoneRegistry;

const INDENT: &[u8] = b"    ";

/// Errors from registry file I/O.
#[derive(Debug, thiserror::Error)]
pub enum RegistryIoError {
    /// Registry file not found at the expected path.
    #[error("Milestone registry not found at {path}")]
    NotFound { path: PathBuf },

    /// Registry file exists but does not hold a valid registry.
    #[error("Milestone registry corrupted at {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    /// Filesystem I/O error.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load the registry stored at `path`.
pub fn read_registry(path: &Path) -> Result<MilestoneRegistry, RegistryIoError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RegistryIoError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RegistryIoError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let registry: MilestoneRegistry =
        serde_json::from_str(&content).map_err(|e| RegistryIoError::Corrupted {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::debug!(
        "Loaded {} active milestone(s) from {}",
        registry.len(),
        path.display()
    );
    Ok(registry)
}

/// Render the registry in its on-disk form (no trailing newline).
pub fn to_json_string(registry: &MilestoneRegistry) -> Result<String, RegistryIoError> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut buf,
        AsciiFormatter {
            inner: PrettyFormatter::with_indent(INDENT),
        },
    );
    registry.serialize(&mut serializer)?;
    // AsciiFormatter only ever emits ASCII.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the registry to `path` atomically.
pub fn write_registry(path: &Path, registry: &MilestoneRegistry) -> Result<(), RegistryIoError> {
    let json = to_json_string(registry)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // The temp file is deleted on drop, so every early return below
    // leaves the directory as it was.
    let mut temp = tempfile::Builder::new()
        .prefix(".milestones")
        .suffix(".json.tmp")
        .tempfile_in(dir)
        .map_err(|e| RegistryIoError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

    temp.write_all(json.as_bytes()).map_err(|e| RegistryIoError::Io {
        path: temp.path().to_path_buf(),
        source: e,
    })?;

    // fsync before the rename so the new contents are durable
    temp.as_file().sync_all().map_err(|e| RegistryIoError::Io {
        path: temp.path().to_path_buf(),
        source: e,
    })?;

    temp.persist(path).map_err(|e| RegistryIoError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!(
        "Wrote {} active milestone(s) to {}",
        registry.len(),
        path.display()
    );
    Ok(())
}

/// Pretty printer that escapes every character outside printable ASCII
/// as `\uXXXX` (surrogate pairs above U+FFFF), the way the registry files
/// have always been written.
struct AsciiFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + std::io::Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + std::io::Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + std::io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> std::io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + std::io::Write>(
        &mut self,
        writer: &mut W,
    ) -> std::io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + std::io::Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + std::io::Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + std::io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> std::io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + std::io::Write>(
        &mut self,
        writer: &mut W,
    ) -> std::io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + std::io::Write>(
        &mut self,
        writer: &mut W,
    ) -> std::io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + std::io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> std::io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

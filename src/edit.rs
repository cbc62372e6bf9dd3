use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A file held fully in memory between read and write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    /// Path the content was read from and will be written back to
    pub path: PathBuf,
    /// Decoded content as read from disk
    pub original: String,
    /// Current (possibly transformed) content
    pub content: String,
    /// Number of malformed bytes dropped while decoding
    pub dropped_bytes: usize,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl EditError {
    pub fn path(&self) -> &Path {
        match self {
            EditError::Io { path, .. } | EditError::Decode { path, .. } => path,
        }
    }
}

impl TextFile {
    /// Read a file that must be valid UTF-8.
    pub fn read_strict(path: impl Into<PathBuf>) -> Result<Self, EditError> {
        let path = path.into();
        let bytes = read_bytes(&path)?;
        let content = String::from_utf8(bytes).map_err(|source| EditError::Decode {
            path: path.clone(),
            source,
        })?;

        Ok(Self::from_content(path, content, 0))
    }

    /// Read a file, dropping malformed UTF-8 sequences instead of failing.
    pub fn read_lossy(path: impl Into<PathBuf>) -> Result<Self, EditError> {
        let path = path.into();
        let bytes = read_bytes(&path)?;
        let (content, dropped) = decode_skipping_invalid(&bytes);

        if dropped > 0 {
            tracing::warn!(
                file = %path.display(),
                dropped,
                "dropped malformed UTF-8 bytes while decoding"
            );
        }

        Ok(Self::from_content(path, content, dropped))
    }

    fn from_content(path: PathBuf, content: String, dropped_bytes: usize) -> Self {
        Self {
            path,
            original: content.clone(),
            content,
            dropped_bytes,
        }
    }

    /// Whether the content differs from what was decoded.
    pub fn is_modified(&self) -> bool {
        self.content != self.original
    }

    /// Write the current content back to `path` atomically.
    pub fn write_back(&self) -> Result<(), EditError> {
        atomic_write(&self.path, self.content.as_bytes())?;
        tracing::info!(file = %self.path.display(), bytes = self.content.len(), "wrote file");
        Ok(())
    }

    /// Write back only when the content changed. Returns whether it wrote.
    pub fn write_if_modified(&self) -> Result<bool, EditError> {
        if !self.is_modified() {
            return Ok(false);
        }
        self.write_back()?;
        Ok(true)
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, EditError> {
    fs::read(path).map_err(|source| EditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode UTF-8, skipping every malformed byte sequence.
///
/// Returns the decoded text and the number of bytes dropped.
pub fn decode_skipping_invalid(bytes: &[u8]) -> (String, usize) {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0;

    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }

    (text, dropped)
}

/// Line terminator convention of a text buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// `CrLf` as soon as the text contains one `\r\n`.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    /// Rewrite `text` with `\n` terminators.
    pub fn normalize(self, text: &str) -> String {
        match self {
            LineEnding::Lf => text.to_string(),
            LineEnding::CrLf => text.replace("\r\n", "\n"),
        }
    }

    /// Rewrite LF-terminated `text` in this convention.
    ///
    /// Mixed input comes out uniformly CRLF.
    pub fn restore(self, text: &str) -> String {
        match self {
            LineEnding::Lf => text.to_string(),
            LineEnding::CrLf => text.replace("\r\n", "\n").replace('\n', "\r\n"),
        }
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the original file is left in place.
/// A symlinked `path` is written through: the link stays and its target
/// receives the content.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let io_err = |source: std::io::Error| EditError::Io {
        path: path.to_path_buf(),
        source,
    };

    let target = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(io_err(e)),
    };

    // Create tempfile in same directory to ensure same filesystem
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;

    temp.write_all(content).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;

    // Keep the target's permissions across the rename
    if let Ok(metadata) = fs::metadata(&target) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(io_err)?;
    }

    temp.persist(&target).map_err(|e| io_err(e.error))?;

    Ok(())
}

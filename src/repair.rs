//! Mojibake repair across the files of one directory.
//!
//! Only the directory's own entries are scanned (no recursion), and only
//! regular files whose name ends with one of the configured suffixes are
//! opened. A failure on one file is recorded and the batch continues; an
//! entry that cannot even be inspected (a dangling symlink, say) counts as
//! a failure only when its name carries a recognized suffix.

use crate::edit::{EditError, TextFile};
use crate::rule::RuleSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Outcome for one scanned file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Content changed (and was written unless dry-run)
    Repaired {
        file: PathBuf,
        replacements: usize,
        before: String,
        after: String,
    },
    /// No corrupted sequence found; file untouched
    Unchanged { file: PathBuf },
    /// Reading or writing failed
    Failed { file: PathBuf, error: EditError },
}

impl FileOutcome {
    pub fn file(&self) -> &Path {
        match self {
            FileOutcome::Repaired { file, .. }
            | FileOutcome::Unchanged { file }
            | FileOutcome::Failed { file, .. } => file,
        }
    }

    /// File name for report lines.
    pub fn file_name(&self) -> String {
        let file = self.file();
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string())
    }
}

/// All outcomes of a repair run, in directory-name order.
#[derive(Debug, Default)]
pub struct RepairReport {
    pub outcomes: Vec<FileOutcome>,
}

impl RepairReport {
    pub fn repaired(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Repaired { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn repaired_count(&self) -> usize {
        self.repaired().count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Unchanged { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("failed to list directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("no file extensions configured")]
    NoExtensions,

    #[error("file extension must not be empty")]
    EmptyExtension,
}

/// Options for a repair run.
#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// File name suffixes to scan, e.g. `.tsx`
    pub extensions: Vec<String>,
    /// Compute outcomes without writing
    pub dry_run: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            extensions: crate::mojibake::DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            dry_run: false,
        }
    }
}

/// Whether `name` ends with one of `extensions`.
///
/// Suffixes are matched literally against the whole name, so `.ts` also
/// matches `types.d.ts`.
pub fn has_recognized_extension(name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Normalize a user-supplied extension to a leading-dot suffix.
///
/// Usable directly as a clap `value_parser`.
pub fn normalize_extension(ext: &str) -> Result<String, RepairError> {
    let ext = ext.trim();
    if is_blank_extension(ext) {
        return Err(RepairError::EmptyExtension);
    }

    if ext.starts_with('.') {
        Ok(ext.to_string())
    } else {
        Ok(format!(".{ext}"))
    }
}

// "" and "." would match every (or every dot-terminated) name
fn is_blank_extension(ext: &str) -> bool {
    ext.trim().trim_start_matches('.').is_empty()
}

/// A directory entry selected by [`candidate_files`].
#[derive(Debug)]
pub enum Candidate {
    /// Regular file (or link to one) with a recognized suffix
    File(PathBuf),
    /// Entry with a recognized suffix whose type could not be read
    Unreadable { file: PathBuf, error: EditError },
}

impl Candidate {
    pub fn path(&self) -> &Path {
        match self {
            Candidate::File(file) | Candidate::Unreadable { file, .. } => file,
        }
    }
}

/// List candidate files of `dir`, sorted by name.
///
/// Fails only when `dir` itself cannot be read. Entries that error out are
/// dropped unless their name has a recognized suffix, in which case they
/// come back as [`Candidate::Unreadable`].
pub fn candidate_files(dir: &Path, extensions: &[String]) -> Result<Vec<Candidate>, RepairError> {
    let mut candidates = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if let Some(candidate) = unreadable_entry(dir, err, extensions)? {
                    candidates.push(candidate);
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if has_recognized_extension(&name, extensions) {
            candidates.push(Candidate::File(entry.into_path()));
        }
    }

    Ok(candidates)
}

fn unreadable_entry(
    dir: &Path,
    err: walkdir::Error,
    extensions: &[String],
) -> Result<Option<Candidate>, RepairError> {
    let Some(file) = err.path().filter(|_| err.depth() > 0).map(Path::to_path_buf) else {
        return Err(RepairError::ListDir {
            path: dir.to_path_buf(),
            source: err,
        });
    };

    let recognized = file
        .file_name()
        .is_some_and(|name| has_recognized_extension(&name.to_string_lossy(), extensions));
    if !recognized {
        tracing::debug!(file = %file.display(), error = %err, "skipping unreadable entry");
        return Ok(None);
    }

    tracing::warn!(file = %file.display(), error = %err, "failed to inspect entry");
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));

    Ok(Some(Candidate::Unreadable {
        error: EditError::Io {
            path: file.clone(),
            source,
        },
        file,
    }))
}

/// Repair a single file with `rules`.
pub fn repair_file(path: &Path, rules: &RuleSet, dry_run: bool) -> FileOutcome {
    let mut text = match TextFile::read_lossy(path) {
        Ok(text) => text,
        Err(error) => {
            tracing::warn!(file = %path.display(), %error, "failed to read file");
            return FileOutcome::Failed {
                file: path.to_path_buf(),
                error,
            };
        }
    };

    let applied = rules.apply(&text.content);
    let replacements = applied.total_replacements();
    text.content = applied.text;

    if !text.is_modified() {
        return FileOutcome::Unchanged { file: text.path };
    }

    if !dry_run {
        if let Err(error) = text.write_back() {
            tracing::warn!(file = %path.display(), %error, "failed to write file");
            return FileOutcome::Failed {
                file: text.path,
                error,
            };
        }
    }

    FileOutcome::Repaired {
        file: text.path,
        replacements,
        before: text.original,
        after: text.content,
    }
}

/// Repair every recognized file directly inside `dir`.
///
/// Only failing to list `dir` itself is an error; per-file failures are
/// reported as [`FileOutcome::Failed`].
pub fn repair_dir(
    dir: impl AsRef<Path>,
    rules: &RuleSet,
    options: &RepairOptions,
) -> Result<RepairReport, RepairError> {
    if options.extensions.is_empty() {
        return Err(RepairError::NoExtensions);
    }
    if options.extensions.iter().any(|ext| is_blank_extension(ext)) {
        return Err(RepairError::EmptyExtension);
    }

    let dir = dir.as_ref();
    let candidates = candidate_files(dir, &options.extensions)?;
    tracing::debug!(dir = %dir.display(), count = candidates.len(), "scanning files");

    let outcomes = candidates
        .into_iter()
        .map(|candidate| match candidate {
            Candidate::File(file) => repair_file(&file, rules, options.dry_run),
            Candidate::Unreadable { file, error } => FileOutcome::Failed { file, error },
        })
        .collect();

    Ok(RepairReport { outcomes })
}

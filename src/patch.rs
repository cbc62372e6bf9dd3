//! Guarded literal patching of a single file.
//!
//! Each rule is applied only if its search block is present in the current
//! content. A missing block is an outcome, not an error, so running a patch
//! a second time reports every rule as not found and leaves the file as is.

use crate::edit::{EditError, LineEnding, TextFile};
use crate::rule::RuleSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Outcome of one guarded rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOutcome should be checked for applied/not-found"]
pub enum PatchOutcome {
    /// The block was present and every occurrence was replaced
    Applied { rule: String, occurrences: usize },
    /// The block was not present; content left untouched
    NotFound { rule: String },
}

impl PatchOutcome {
    pub fn rule(&self) -> &str {
        match self {
            PatchOutcome::Applied { rule, .. } | PatchOutcome::NotFound { rule } => rule,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied { .. })
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOutcome::Applied { rule, occurrences } => {
                write!(f, "{rule}: replaced {occurrences} occurrence(s)")
            }
            PatchOutcome::NotFound { rule } => write!(f, "{rule}: not found"),
        }
    }
}

/// Result of patching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub file: PathBuf,
    pub outcomes: Vec<PatchOutcome>,
    /// Content before the patch
    pub before: String,
    /// Content after the patch
    pub after: String,
    /// Whether the content was written back to disk
    pub written: bool,
    /// Line terminators of the file on disk
    pub line_ending: LineEnding,
}

impl PatchReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("rule set is empty; nothing to patch")]
    NoRules,
}

/// Options controlling how a patch run touches the disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Compute outcomes without writing
    pub dry_run: bool,
}

/// Apply every rule of `rules` whose search block is present in `content`.
pub fn apply_guarded(content: &str, rules: &RuleSet) -> (String, Vec<PatchOutcome>) {
    let mut current = content.to_string();
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in rules.rules() {
        let label = rule.label();
        let (next, occurrences) = rule.apply(&current);

        if occurrences == 0 {
            tracing::debug!(rule = %label, "guarded block not found");
            outcomes.push(PatchOutcome::NotFound { rule: label });
            continue;
        }

        current = next;
        outcomes.push(PatchOutcome::Applied {
            rule: label,
            occurrences,
        });
    }

    (current, outcomes)
}

/// Read `path`, apply the guarded rules and write the result back.
///
/// Blocks are matched against the content with `\r\n` folded to `\n`, so a
/// CRLF file matches LF rule text; the patched file keeps CRLF. The file is
/// rewritten even when no rule matched, unless `dry_run` is set. Missing or
/// non-UTF-8 files fail before anything is written.
pub fn patch_file(
    path: impl AsRef<Path>,
    rules: &RuleSet,
    options: PatchOptions,
) -> Result<PatchReport, PatchError> {
    if rules.is_empty() {
        return Err(PatchError::NoRules);
    }

    let mut file = TextFile::read_strict(path.as_ref())?;
    let line_ending = LineEnding::detect(&file.original);
    let (patched, outcomes) = apply_guarded(&line_ending.normalize(&file.original), rules);

    // untouched files keep their bytes, mixed line endings included
    if outcomes.iter().any(PatchOutcome::is_applied) {
        file.content = line_ending.restore(&patched);
    }

    let written = if options.dry_run {
        false
    } else {
        file.write_back()?;
        true
    };

    Ok(PatchReport {
        file: file.path,
        outcomes,
        before: file.original,
        after: file.content,
        written,
        line_ending,
    })
}

//! textfix: guarded literal patching and mojibake repair for source trees
//!
//! Two run-once maintenance tools built on one primitive: the literal
//! [`Rule`], an exact (search, replace) pair applied in order by a
//! [`RuleSet`].
//!
//! - [`patch`] applies guarded rules to a single file. A rule whose search
//!   block is absent reports [`PatchOutcome::NotFound`] and changes nothing,
//!   which makes a second run a no-op.
//! - [`repair`] scans one directory (non-recursive) for files with the
//!   recognized suffixes and rewrites only those whose content changed.
//!
//! # Safety
//!
//! - Writes are atomic (tempfile + fsync + rename)
//! - Malformed UTF-8 is dropped during repair, rejected during patching
//! - A failing file does not abort a repair batch
//!
//! # Example
//!
//! ```
//! use textfix::mojibake_rules;
//!
//! let fixed = mojibake_rules().apply("const x = 'CafÃ©'");
//! assert_eq!(fixed.text, "const x = 'Café'");
//! ```

pub mod config;
pub mod edit;
pub mod mojibake;
pub mod patch;
pub mod repair;
pub mod reset;
pub mod rule;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, RuleConfig};
pub use edit::{atomic_write, EditError, LineEnding, TextFile};
pub use mojibake::{mojibake_rules, MOJIBAKE_RULES};
pub use patch::{apply_guarded, patch_file, PatchError, PatchOptions, PatchOutcome, PatchReport};
pub use repair::{repair_dir, FileOutcome, RepairError, RepairOptions, RepairReport};
pub use reset::reset_detection_rules;
pub use rule::{Applied, Rule, RuleSet, Shadowing};

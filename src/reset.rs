//! Built-in guarded rules for the password-reset detection patch.
//!
//! The application decides whether to render the reset-password screen by
//! inspecting `window.location.hash`. Reset links that carry a `resetToken`
//! query parameter were not recognized; these rules add that check to both
//! the signed-out and the signed-in branch of `App.tsx`.

use crate::rule::{Rule, RuleSet};

/// Signed-out branch, before the patch.
pub const NO_SESSION_OLD: &str = r#"  if (!session && !supabaseUnavailable) {
    // Verifica se é uma página de reset de senha (token vem como hash)
    const hash = window.location.hash;
    const isResetPassword = hash.includes('type=recovery') || hash.includes('type=magiclink');"#;

/// Signed-out branch, after the patch.
pub const NO_SESSION_NEW: &str = r#"  if (!session && !supabaseUnavailable) {
    // Verifica se é uma página de reset de senha (token vem como hash ou query)
    const hash = window.location.hash;
    const searchParams = new URLSearchParams(window.location.search);
    const hasResetToken = searchParams.has('resetToken');
    const isResetPassword = hash.includes('type=recovery') || hash.includes('type=magiclink') || hasResetToken;"#;

/// Signed-in branch, before the patch.
pub const HAS_SESSION_OLD: &str = r#"  // Verifica reset de senha mesmo com sessão ativa (caso token expire)
  const hash = window.location.hash;
  if (hash.includes('type=recovery')) {"#;

/// Signed-in branch, after the patch.
pub const HAS_SESSION_NEW: &str = r#"  // Verifica reset de senha mesmo com sessão ativa (caso token expire)
  const hash = window.location.hash;
  const searchParams = new URLSearchParams(window.location.search);
  const hasResetToken = searchParams.has('resetToken');
  if (hash.includes('type=recovery') || hasResetToken) {"#;

/// Default target file, relative to the application root.
pub const DEFAULT_TARGET: &str = "App.tsx";

/// Both reset-detection rules in application order.
pub fn reset_detection_rules() -> RuleSet {
    RuleSet::new(vec![
        Rule::new(NO_SESSION_OLD, NO_SESSION_NEW).with_id("no-session-reset-check"),
        Rule::new(HAS_SESSION_OLD, HAS_SESSION_NEW).with_id("has-session-reset-check"),
    ])
}

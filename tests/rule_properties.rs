//! Property tests for the literal rule engine

use proptest::prelude::*;
use textfix::mojibake::mojibake_rules;
use textfix::patch::apply_guarded;
use textfix::reset::reset_detection_rules;

proptest! {
    /// Text free of the mojibake lead characters is never changed.
    #[test]
    fn clean_text_is_untouched(text in "[^Ãðâ]{0,200}") {
        let applied = mojibake_rules().apply(&text);
        prop_assert_eq!(applied.text, text);
        prop_assert!(applied.hits.is_empty());
    }

    /// Repaired text contains nothing left to repair.
    #[test]
    fn repair_is_idempotent(
        parts in proptest::collection::vec(
            prop_oneof![
                "[a-zA-Z0-9 .,'<>/=]{0,12}",
                proptest::sample::select(
                    textfix::MOJIBAKE_RULES.iter().map(|(s, _)| s.to_string()).collect::<Vec<_>>()
                ),
            ],
            0..20,
        )
    ) {
        let rules = mojibake_rules();
        let once = rules.apply(&parts.concat()).text;
        let twice = rules.apply(&once);
        prop_assert_eq!(&twice.text, &once);
        prop_assert!(twice.hits.is_empty());
    }

    /// Guarded patching is a no-op the second time around.
    #[test]
    fn guarded_patch_is_idempotent(prefix in "[a-z \n]{0,40}", suffix in "[a-z \n]{0,40}") {
        let rules = reset_detection_rules();
        let source = format!(
            "{prefix}{}{suffix}{}",
            textfix::reset::NO_SESSION_OLD,
            textfix::reset::HAS_SESSION_OLD
        );

        let (once, _) = apply_guarded(&source, &rules);
        let (twice, outcomes) = apply_guarded(&once, &rules);
        prop_assert_eq!(twice, once);
        prop_assert!(outcomes.iter().all(|o| !o.is_applied()));
    }
}

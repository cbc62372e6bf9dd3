//! Built-in mojibake repair table.
//!
//! Each entry maps the text produced when UTF-8 bytes are decoded as
//! Windows-1252 back to the intended character. Bytes that Windows-1252
//! leaves undefined survive as C1 control characters (U+0081, U+008D,
//! U+008F, U+0090, U+009D) or as a soft hyphen (U+00AD); they are written
//! as escapes because most editors do not render them.

use crate::rule::RuleSet;

/// Repair rules in application order.
pub const MOJIBAKE_RULES: &[(&str, &str)] = &[
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã\u{ad}", "í"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã¢", "â"),
    ("Ãª", "ê"),
    ("Ã´", "ô"),
    ("Ã£", "ã"),
    ("Ãµ", "õ"),
    ("Ã§", "ç"),
    ("Ã€", "À"),
    ("Ã\u{81}", "Á"),
    ("Ã‰", "É"),
    ("Ã\u{8d}", "Í"),
    ("Ã“", "Ó"),
    ("Ãš", "Ú"),
    ("Ã‡", "Ç"),
    ("ÃŠ", "Ê"),
    ("Ã’", "Ò"),
    ("ðŸ\u{90}¦", "🐦"),
    ("ðŸ\u{8f}†", "🏆"),
    ("ðŸ‘‘", "👑"),
    ("ðŸ’¡", "💡"),
    ("ðŸ“ˆ", "📈"),
    ("âœ¨", "✨"),
    ("â\u{9d}Œ", "❌"),
    ("â„¹ï¸\u{8f}", "ℹ\u{fe0f}"),
    ("âœ“", "✓"),
    ("â—‹", "○"),
    ("ðŸ‘¥", "👥"),
    ("ðŸ§¬", "🧬"),
    ("ðŸ“‹", "📋"),
    ("â€¢", "•"),
    ("Ã—", "×"),
];

/// File name suffixes scanned by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".tsx", ".ts"];

/// The built-in table as a [`RuleSet`].
pub fn mojibake_rules() -> RuleSet {
    RuleSet::from_pairs(MOJIBAKE_RULES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        assert_eq!(MOJIBAKE_RULES.len(), 35);
    }

    #[test]
    fn test_every_rule_repairs_its_own_pattern() {
        let rules = mojibake_rules();
        for (search, replace) in MOJIBAKE_RULES {
            assert_eq!(
                rules.apply(search).text,
                *replace,
                "rule {search:?} did not produce {replace:?}"
            );
        }
    }

    #[test]
    fn test_no_rule_shadows_another() {
        let issues = mojibake_rules().shadowing();
        assert!(issues.is_empty(), "ordering hazards: {issues:?}");
    }

    #[test]
    fn test_patterns_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (search, _) in MOJIBAKE_RULES {
            assert!(seen.insert(*search), "duplicate pattern {search:?}");
        }
    }

    #[test]
    fn test_patterns_are_utf8_read_as_cp1252() {
        // every replacement, encoded as UTF-8 and read back byte-per-char
        // through Windows-1252, yields its search text
        for (search, replace) in MOJIBAKE_RULES {
            let garbled: String = replace.bytes().map(cp1252_char).collect();
            assert_eq!(garbled, *search, "replacement {replace:?}");
        }
    }

    #[test]
    fn test_cafe_scenario() {
        let applied = mojibake_rules().apply("const x = 'CafÃ©'");
        assert_eq!(applied.text, "const x = 'Café'");
        assert_eq!(applied.total_replacements(), 1);
    }

    #[test]
    fn test_clean_text_untouched() {
        let text = "export const title = 'Relatório de aves';\n";
        let applied = mojibake_rules().apply(text);
        assert_eq!(applied.text, text);
        assert!(applied.hits.is_empty());
    }

    fn cp1252_char(byte: u8) -> char {
        const HIGH: [char; 32] = [
            '\u{20ac}', '\u{81}', '\u{201a}', '\u{192}', '\u{201e}', '\u{2026}', '\u{2020}',
            '\u{2021}', '\u{2c6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8d}',
            '\u{17d}', '\u{8f}', '\u{90}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}',
            '\u{2022}', '\u{2013}', '\u{2014}', '\u{2dc}', '\u{2122}', '\u{161}', '\u{203a}',
            '\u{153}', '\u{9d}', '\u{17e}', '\u{178}',
        ];
        match byte {
            0x80..=0x9f => HIGH[(byte - 0x80) as usize],
            _ => byte as char,
        }
    }
}

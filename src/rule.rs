//! Literal replacement rules and ordered rule sets.
//!
//! A [`Rule`] is an exact (search, replace) pair. A [`RuleSet`] applies its
//! rules one after another to the same buffer, so the output of an earlier
//! rule is the input of the next. Order is never changed implicitly.

use std::fmt;

/// A single literal substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Optional human-readable identifier used in reports
    pub id: Option<String>,
    /// Exact text to look for
    pub search: String,
    /// Text that replaces every occurrence of `search`
    pub replace: String,
}

impl Rule {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            id: None,
            search: search.into(),
            replace: replace.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Label for reports: the id when present, otherwise the escaped search text.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{:?}", self.search),
        }
    }

    /// Number of non-overlapping occurrences of the search text.
    pub fn count_in(&self, text: &str) -> usize {
        if self.search.is_empty() {
            return 0;
        }
        text.matches(self.search.as_str()).count()
    }

    /// Replace every occurrence, returning the new text and the hit count.
    ///
    /// An empty search text never matches.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let count = self.count_in(text);
        if count == 0 {
            return (text.to_string(), 0);
        }
        (text.replace(self.search.as_str(), &self.replace), count)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} -> {:?}", self.search, self.replace)
    }
}

/// An ordered table of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

/// Result of running a [`RuleSet`] over a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Applied carries the rewritten text"]
pub struct Applied {
    pub text: String,
    /// (rule index, occurrences replaced) for every rule that matched
    pub hits: Vec<(usize, usize)>,
}

impl Applied {
    pub fn total_replacements(&self) -> usize {
        self.hits.iter().map(|(_, count)| count).sum()
    }
}

/// An ordering hazard between two rules of the same set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shadowing {
    /// `earlier.search` occurs inside `later.search`; applying the earlier
    /// rule first can break a later match.
    SearchInSearch { earlier: usize, later: usize },
    /// `earlier.replace` contains `later.search`; the later rule rewrites
    /// text the earlier rule produced.
    ReplaceFeedsSearch { earlier: usize, later: usize },
}

impl fmt::Display for Shadowing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shadowing::SearchInSearch { earlier, later } => write!(
                f,
                "rule #{earlier} search text occurs inside rule #{later} search text"
            ),
            Shadowing::ReplaceFeedsSearch { earlier, later } => write!(
                f,
                "rule #{earlier} output contains rule #{later} search text"
            ),
        }
    }
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build from a static `(search, replace)` table.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            rules: pairs.iter().map(|&(s, r)| Rule::new(s, r)).collect(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order to `text`.
    pub fn apply(&self, text: &str) -> Applied {
        let mut current = text.to_string();
        let mut hits = Vec::new();

        for (idx, rule) in self.rules.iter().enumerate() {
            let (next, count) = rule.apply(&current);
            if count > 0 {
                tracing::debug!(rule = %rule.label(), count, "rule matched");
                hits.push((idx, count));
                current = next;
            }
        }

        Applied {
            text: current,
            hits,
        }
    }

    /// Report ordering hazards between rules.
    ///
    /// Only pairs where the earlier rule can interfere with a later one are
    /// reported; a later rule containing an earlier rule's search text in
    /// its own search is harmless in the other direction.
    pub fn shadowing(&self) -> Vec<Shadowing> {
        let mut issues = Vec::new();

        for (i, earlier) in self.rules.iter().enumerate() {
            if earlier.search.is_empty() {
                continue;
            }
            for (j, later) in self.rules.iter().enumerate().skip(i + 1) {
                if later.search.is_empty() {
                    continue;
                }
                if later.search.contains(earlier.search.as_str()) {
                    issues.push(Shadowing::SearchInSearch {
                        earlier: i,
                        later: j,
                    });
                }
                if earlier.replace.contains(later.search.as_str()) {
                    issues.push(Shadowing::ReplaceFeedsSearch {
                        earlier: i,
                        later: j,
                    });
                }
            }
        }

        issues
    }

    /// A copy ordered by descending search length.
    ///
    /// The sort is stable, so rules of equal length keep their relative order.
    pub fn sorted_by_specificity(&self) -> RuleSet {
        let mut rules = self.rules.clone();
        rules.sort_by(|a, b| b.search.len().cmp(&a.search.len()));
        RuleSet { rules }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_apply_counts_all_occurrences() {
        let rule = Rule::new("Ã©", "é");
        let (text, count) = rule.apply("CafÃ© and cafÃ©");
        assert_eq!(text, "Café and café");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_rule_apply_no_match_is_identity() {
        let rule = Rule::new("missing", "x");
        let (text, count) = rule.apply("hello world");
        assert_eq!(text, "hello world");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_empty_search_never_matches() {
        let rule = Rule::new("", "x");
        assert_eq!(rule.apply("abc"), ("abc".to_string(), 0));
    }

    #[test]
    fn test_rule_label_prefers_id() {
        assert_eq!(Rule::new("a", "b").with_id("first").label(), "first");
        assert_eq!(Rule::new("a", "b").label(), "\"a\"");
    }

    #[test]
    fn test_ruleset_applies_in_order() {
        // second rule sees the output of the first
        let set = RuleSet::from_pairs(&[("a", "b"), ("b", "c")]);
        let applied = set.apply("a");
        assert_eq!(applied.text, "c");
        assert_eq!(applied.hits, vec![(0, 1), (1, 1)]);
        assert_eq!(applied.total_replacements(), 2);
    }

    #[test]
    fn test_shadowing_detects_prefix_rule() {
        let set = RuleSet::from_pairs(&[("Ã", "Á"), ("Ã©", "é")]);
        assert_eq!(
            set.shadowing(),
            vec![Shadowing::SearchInSearch {
                earlier: 0,
                later: 1
            }]
        );
        // the short rule eats the lead character of the longer pattern
        assert_eq!(set.apply("Ã©").text, "Á©");
    }

    #[test]
    fn test_shadowing_ignores_longer_rule_first() {
        let set = RuleSet::from_pairs(&[("Ã©", "é"), ("Ã", "Á")]);
        assert!(set.shadowing().is_empty());
        assert_eq!(set.apply("Ã©Ã").text, "éÁ");
    }

    #[test]
    fn test_shadowing_detects_replace_feeding_search() {
        let set = RuleSet::from_pairs(&[("x", "yz"), ("z", "w")]);
        assert_eq!(
            set.shadowing(),
            vec![Shadowing::ReplaceFeedsSearch {
                earlier: 0,
                later: 1
            }]
        );
    }

    #[test]
    fn test_sorted_by_specificity_fixes_prefix_collision() {
        let set = RuleSet::from_pairs(&[("Ã", "Á"), ("x", "y"), ("Ã©", "é")]);
        let sorted = set.sorted_by_specificity();
        assert_eq!(sorted.rules()[0].search, "Ã©");
        assert!(sorted.shadowing().is_empty());
        assert_eq!(sorted.apply("Ã©").text, "é");
    }
}

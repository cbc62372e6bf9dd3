use crate::rule::{Rule, RuleSet, Shadowing};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    #[serde(default)]
    pub id: Option<String>,
    pub search: String,
    pub replace: String,
}

impl RuleDefinition {
    fn display_id(&self, idx: usize) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => format!("#{idx}"),
        }
    }
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            let rule_id = rule.display_id(idx);

            if rule.search.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: rule_id.clone(),
                    field: "search",
                });
                continue;
            }
            if rule.search == rule.replace {
                issues.push(ValidationIssue::NoOp { rule_id: rule_id.clone() });
            }
            if !seen.insert(rule.search.as_str()) {
                issues.push(ValidationIssue::DuplicateSearch { rule_id });
            }
        }

        for shadowing in self.to_rule_set().shadowing() {
            if let Shadowing::SearchInSearch { earlier, later } = shadowing {
                // exact duplicates are already reported above
                if self.rules[earlier].search != self.rules[later].search {
                    issues.push(ValidationIssue::Shadowed {
                        earlier: self.rules[earlier].display_id(earlier),
                        later: self.rules[later].display_id(later),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Rules in file order.
    pub fn to_rule_set(&self) -> RuleSet {
        self.rules
            .iter()
            .map(|def| {
                let rule = Rule::new(def.search.clone(), def.replace.clone());
                match &def.id {
                    Some(id) => rule.with_id(id.clone()),
                    None => rule,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: String,
        field: &'static str,
    },
    NoOp {
        rule_id: String,
    },
    DuplicateSearch {
        rule_id: String,
    },
    Shadowed {
        earlier: String,
        later: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule config contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => {
                write!(f, "rule '{rule_id}' missing required field '{field}'")
            }
            ValidationIssue::NoOp { rule_id } => {
                write!(f, "rule '{rule_id}' replaces text with itself")
            }
            ValidationIssue::DuplicateSearch { rule_id } => {
                write!(f, "rule '{rule_id}' repeats an earlier search text")
            }
            ValidationIssue::Shadowed { earlier, later } => write!(
                f,
                "rule '{earlier}' search text occurs inside rule '{later}'; list '{later}' first"
            ),
        }
    }
}

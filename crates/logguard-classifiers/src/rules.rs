//! Ordered pattern rule set (first match wins)

use crate::builtin_rules::DEFAULT_RULES;
use logguard_core::{Category, Error, Result};
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// A single trigger expression and the label it assigns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Optional human-readable identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Case-insensitive regular expression, searched anywhere in the text
    pub pattern: String,

    /// Label assigned when the pattern matches
    pub label: Category,

    /// Disabled rules are dropped when the set is built
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Rule {
    /// Create an enabled, unnamed rule
    pub fn new(pattern: impl Into<String>, label: Category) -> Self {
        Self {
            name: None,
            pattern: pattern.into(),
            label,
            enabled: true,
        }
    }

    /// Set the rule name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn describe(&self, index: usize) -> String {
        match &self.name {
            Some(name) => format!("rule #{} ('{}')", index, name),
            None => format!("rule #{}", index),
        }
    }
}

/// Rules file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// The winning rule for a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Position of the rule in the set
    pub index: usize,

    /// Label of the rule
    pub label: Category,

    /// Byte span of the match within the searched text
    pub span: (usize, usize),
}

/// Immutable, ordered collection of compiled rules.
///
/// Order is precedence: when several rules match, the one defined first wins.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    regexes: Vec<Regex>,
    set: RegexSet,
}

impl RuleSet {
    /// Compile rules in the given order, skipping disabled ones
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        let rules: Vec<Rule> = rules.into_iter().filter(|r| r.enabled).collect();

        let mut regexes = Vec::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            if !rule.label.is_assignable() {
                return Err(Error::rule(format!(
                    "{} uses reserved label '{}'",
                    rule.describe(index),
                    rule.label
                )));
            }

            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    Error::rule(format!("{} has an invalid pattern: {}", rule.describe(index), e))
                })?;
            regexes.push(regex);
        }

        let set = RegexSetBuilder::new(rules.iter().map(|r| r.pattern.as_str()))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::rule(format!("Failed to build rule matcher: {}", e)))?;

        debug!("Compiled {} rules", rules.len());

        Ok(Self {
            rules,
            regexes,
            set,
        })
    }

    /// The built-in rule table
    pub fn builtin() -> Result<Self> {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(pattern, label)| Rule::new(*pattern, *label))
            .collect();
        let set = Self::new(rules)?;
        info!("Loaded built-in rule table with {} rules", set.len());
        Ok(set)
    }

    /// Parse a rule set from a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: RuleFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse rules: {}", e)))?;
        Self::new(file.rules)
    }

    /// Load a rule set from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read rules file {}: {}", path.display(), e))
        })?;
        let set = Self::from_yaml(&content)?;
        info!("Loaded {} rules from {}", set.len(), path.display());
        Ok(set)
    }

    /// Return a new set with `rules` evaluated ahead of this one
    pub fn with_prepended(&self, rules: Vec<Rule>) -> Result<Self> {
        let mut combined = rules;
        combined.extend(self.rules.iter().cloned());
        Self::new(combined)
    }

    /// Find the first rule, in definition order, whose pattern occurs in `text`
    pub fn classify_by_rule(&self, text: &str) -> Option<RuleMatch> {
        // SetMatches iterates in ascending index order.
        let index = self.set.matches(text).iter().next()?;
        let span = self.regexes[index]
            .find(text)
            .map(|m| (m.start(), m.end()))
            .unwrap_or((0, 0));

        Some(RuleMatch {
            index,
            label: self.rules[index].label,
            span,
        })
    }

    /// Rules in precedence order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

//! Pattern-based extraction of models, tracking numbers and author from
//! document text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::config::{HarvestConfig, StandardizationRule};
use crate::document::NOT_FOUND;
use crate::patterns::{PatternKind, PatternStore, FALLBACK_MODEL_PATTERNS};

static RE_AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^Author:[ \t]*(.*)$").unwrap());

/// Fields harvested from one document. Lists are deduplicated and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestedFields {
    pub models: Vec<String>,
    pub author: String,
    pub tracking_numbers: Vec<String>,
}

impl HarvestedFields {
    /// Models joined with ", ", or the "Not Found" sentinel.
    pub fn models_display(&self) -> String {
        if self.models.is_empty() {
            NOT_FOUND.to_string()
        } else {
            self.models.join(", ")
        }
    }

    pub fn tracking_display(&self) -> String {
        self.tracking_numbers.join(", ")
    }

    pub fn has_models(&self) -> bool {
        !self.models.is_empty()
    }
}

pub struct Harvester {
    rules: HarvestConfig,
    store: PatternStore,
}

impl Harvester {
    pub fn new(rules: HarvestConfig, store: PatternStore) -> Self {
        Self { rules, store }
    }

    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    /// Harvests all fields. The custom pattern source is re-read on every call.
    pub fn harvest(&self, text: &str, file_name: &str) -> HarvestedFields {
        let name_text = file_name.replace('_', " ");
        let sources = [text, name_text.as_str()];

        let model_patterns = compile_all(&self.store.combined(PatternKind::Model), true);
        let mut models = self.collect(&model_patterns, &sources);

        if models.is_empty() && self.rules.fallback_patterns_enabled {
            tracing::debug!(file = %file_name, "No models matched, trying fallback patterns");
            let fallback = compile_all(FALLBACK_MODEL_PATTERNS, false);
            models = self
                .collect(&fallback, &sources)
                .into_iter()
                .filter(|m| m.chars().count() >= 3 && m.chars().any(|c| c.is_ascii_digit()))
                .collect();
        }

        let tracking_patterns = compile_all(&self.store.combined(PatternKind::Tracking), true);
        let tracking = self.collect(&tracking_patterns, &sources);

        let fields = HarvestedFields {
            models: models.into_iter().collect(),
            author: self.harvest_author(text),
            tracking_numbers: tracking.into_iter().collect(),
        };

        tracing::debug!(
            file = %file_name,
            models = fields.models.len(),
            tracking = fields.tracking_numbers.len(),
            "Harvest complete"
        );

        fields
    }

    /// First `Author:` line, trimmed. Placeholder names count as absent.
    pub fn harvest_author(&self, text: &str) -> String {
        let Some(caps) = RE_AUTHOR.captures(text) else {
            return String::new();
        };
        let author = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if author.is_empty() || self.rules.unwanted_authors.iter().any(|u| u == author) {
            return String::new();
        }
        author.to_string()
    }

    pub fn is_excluded(&self, candidate: &str) -> bool {
        let lower = candidate.to_lowercase();
        self.rules
            .exclusion_patterns
            .iter()
            .any(|p| lower.contains(&p.to_lowercase()))
    }

    fn collect(&self, patterns: &[Regex], sources: &[&str]) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        for source in sources.iter().filter(|s| !s.is_empty()) {
            for re in patterns {
                for caps in re.captures_iter(source) {
                    let matched = caps
                        .get(1)
                        .or_else(|| caps.get(0))
                        .map(|m| m.as_str())
                        .unwrap_or_default();
                    if matched.trim().is_empty() || self.is_excluded(matched) {
                        continue;
                    }
                    let cleaned = standardize(matched, &self.rules.standardization_rules);
                    if !cleaned.is_empty() {
                        found.insert(cleaned);
                    }
                }
            }
        }
        found
    }
}

/// Collapses whitespace runs to one space, then applies the literal
/// replacement rules in order.
pub fn standardize(value: &str, rules: &[StandardizationRule]) -> String {
    let mut cleaned = value.split_whitespace().collect::<Vec<_>>().join(" ");
    for rule in rules {
        cleaned = cleaned.replace(&rule.from, &rule.to);
    }
    cleaned
}

fn compile_all<S: AsRef<str>>(patterns: &[S], case_insensitive: bool) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| {
            let p = p.as_ref();
            match RegexBuilder::new(p).case_insensitive(case_insensitive).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(pattern = %p, error = %e, "Skipping invalid pattern");
                    None
                }
            }
        })
        .collect()
}

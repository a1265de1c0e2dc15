//! @ai:module:intent Classify single lines into mark kinds with first-kind-wins priority
//! @ai:module:layer domain
//! @ai:module:public_api Classifier, ClassifierSet
//! @ai:module:depends_on pattern, mark, config
//! @ai:module:stateless true

use crate::config::Config;
use crate::mark::{CategoryFilter, MarkFields, MarkKind};
use crate::pattern::{Matcher, PatternSet};

/// @ai:intent Tests a line against every matcher of one kind
pub struct Classifier {
    kind: MarkKind,
    matchers: Vec<Box<dyn Matcher>>,
}

impl Classifier {
    /// @ai:intent Create a classifier from already-built matchers
    pub fn new(kind: MarkKind, matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { kind, matchers }
    }

    /// @ai:intent Compile a pattern set into a classifier; bad patterns are dropped
    pub fn from_patterns(patterns: &PatternSet) -> Self {
        let matchers = patterns
            .compile()
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn Matcher>)
            .collect();
        Self::new(patterns.kind(), matchers)
    }

    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    /// @ai:intent Extract fields from a line
    /// @ai:post when several matchers apply, the last one in order provides the fields
    /// @ai:effects pure
    pub fn classify(&self, line: &str) -> Option<MarkFields> {
        let mut found = None;
        for matcher in &self.matchers {
            if let Some(fields) = matcher.try_match(line) {
                found = Some(fields);
            }
        }
        found
    }
}

/// @ai:intent Active classifiers in priority order (section, todo, note)
pub struct ClassifierSet {
    classifiers: Vec<Classifier>,
}

impl ClassifierSet {
    /// @ai:intent Build from classifiers, re-sorted into priority order
    pub fn new(mut classifiers: Vec<Classifier>) -> Self {
        classifiers.sort_by_key(|c| c.kind());
        Self { classifiers }
    }

    /// @ai:intent Build the active set fresh from configuration and a requested filter
    /// @ai:post only kinds enabled in config and admitted by filter are present
    /// @ai:edge_cases nothing active -> empty set, logged
    pub fn from_config(config: &Config, filter: &CategoryFilter) -> Self {
        let classifiers: Vec<Classifier> = MarkKind::PRIORITY
            .into_iter()
            .filter(|kind| filter.admits(*kind) && config.is_enabled(*kind))
            .map(|kind| Classifier::from_patterns(&config.pattern_set(kind)))
            .collect();

        if classifiers.is_empty() {
            tracing::warn!("No mark category is active; nothing will be scanned");
        }

        Self { classifiers }
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    pub fn kinds(&self) -> Vec<MarkKind> {
        self.classifiers.iter().map(Classifier::kind).collect()
    }

    /// @ai:intent Classify a line; the first kind in priority order that matches wins
    /// @ai:effects pure
    pub fn classify(&self, line: &str) -> Option<(MarkKind, MarkFields)> {
        self.classifiers
            .iter()
            .find_map(|c| c.classify(line).map(|fields| (c.kind(), fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::RegexMatcher;

    fn regex(kind: MarkKind, pattern: &str) -> Box<dyn Matcher> {
        Box::new(RegexMatcher::new(kind, pattern).unwrap())
    }

    #[test]
    fn test_last_matching_pattern_wins() {
        let classifier = Classifier::new(
            MarkKind::Todo,
            vec![
                regex(MarkKind::Todo, r"TODO:\s*(?P<description>.*)"),
                regex(MarkKind::Todo, r"TODO:\s*(?P<description>\w+)"),
                regex(MarkKind::Todo, r"NEVER"),
            ],
        );
        let fields = classifier.classify("// TODO: first second").unwrap();
        assert_eq!(fields.description, "first");
    }

    #[test]
    fn test_section_beats_todo_on_same_line() {
        let set = ClassifierSet::new(vec![
            Classifier::new(MarkKind::Todo, vec![regex(MarkKind::Todo, "TODO")]),
            Classifier::new(MarkKind::Section, vec![regex(MarkKind::Section, "MARK")]),
        ]);
        let (kind, _) = set.classify("// MARK: TODO list").unwrap();
        assert_eq!(kind, MarkKind::Section);
    }

    #[test]
    fn test_filter_limits_active_kinds() {
        let config = Config::default();
        let set = ClassifierSet::from_config(&config, &CategoryFilter::of([MarkKind::Note]));
        assert_eq!(set.kinds(), vec![MarkKind::Note]);
        assert!(set.classify("// TODO: nope").is_none());
        assert!(set.classify("// NOTE: yes").is_some());
    }

    #[test]
    fn test_disabled_categories_give_empty_set() {
        let config = Config {
            categories: vec![MarkKind::Section],
            ..Default::default()
        };
        let set = ClassifierSet::from_config(&config, &CategoryFilter::of([MarkKind::Todo]));
        assert!(set.is_empty());
        assert!(set.classify("// TODO: anything").is_none());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let set = ClassifierSet::from_config(&Config::default(), &CategoryFilter::all());
        let line = "# TODO(carol): rewrite";
        assert_eq!(set.classify(line), set.classify(line));
    }
}

//! @ai:module:intent Hold configured regular expressions per mark kind and match lines against them
//! @ai:module:layer domain
//! @ai:module:public_api PatternSet, Matcher, RegexMatcher, defaults
//! @ai:module:depends_on mark, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::mark::{MarkFields, MarkKind};
use regex::Regex;

/// @ai:intent Capability to test one line and extract mark fields
pub trait Matcher: Send + Sync {
    /// @ai:intent Match anywhere in the line; None when the pattern does not apply
    fn try_match(&self, line: &str) -> Option<MarkFields>;
}

/// @ai:intent Matcher backed by a regex with `heading`, `description` and `writer` groups
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    kind: MarkKind,
    regex: Regex,
}

impl RegexMatcher {
    /// @ai:intent Compile a pattern for a given kind
    /// @ai:effects pure
    pub fn new(kind: MarkKind, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { kind, regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Matcher for RegexMatcher {
    /// @ai:intent Map named captures onto mark fields
    /// @ai:post heading == char count of the `heading` capture, 0 if absent
    /// @ai:effects pure
    fn try_match(&self, line: &str) -> Option<MarkFields> {
        let captures = self.regex.captures(line)?;

        let heading = captures
            .name("heading")
            .map(|m| m.as_str().chars().count())
            .unwrap_or(0);
        let description = captures
            .name("description")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let writer = if self.kind.has_writer() {
            captures
                .name("writer")
                .map(|m| m.as_str().trim())
                .filter(|w| !w.is_empty())
                .map(str::to_string)
        } else {
            None
        };

        Some(MarkFields {
            heading,
            description,
            writer,
        })
    }
}

/// @ai:intent Ordered pattern list for one kind: base patterns first, then additional ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    kind: MarkKind,
    patterns: Vec<String>,
}

impl PatternSet {
    /// @ai:intent Merge base and additional pattern lists
    /// @ai:post patterns == base ++ additional
    pub fn new(kind: MarkKind, base: &[String], additional: &[String]) -> Self {
        let patterns = base.iter().chain(additional.iter()).cloned().collect();
        Self { kind, patterns }
    }

    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// @ai:intent Compile every pattern, skipping the ones that fail
    /// @ai:post result preserves configured order
    /// @ai:edge_cases invalid regex -> logged and skipped, never an error
    pub fn compile(&self) -> Vec<RegexMatcher> {
        self.patterns
            .iter()
            .filter_map(|pattern| match RegexMatcher::new(self.kind, pattern) {
                Ok(matcher) => Some(matcher),
                Err(e) => {
                    tracing::warn!("Skipping {} pattern: {}", self.kind, e);
                    None
                }
            })
            .collect()
    }
}

/// Built-in base patterns, used when the configuration does not override them.
pub mod defaults {
    /// Comment leaders recognised by the built-in patterns.
    const LEADER: &str = r"(?:^|\s)(?://+!?|#+|--|;+|/\*+|\*+)\s*";
    const TAIL: &str = r"\s*(?:\*/)?\s*$";

    pub fn section() -> Vec<String> {
        vec![format!(
            r"{LEADER}(?:SECTION|MARK):\s*(?P<heading>#*)\s*(?P<description>.*?){TAIL}"
        )]
    }

    pub fn todo() -> Vec<String> {
        vec![
            format!(
                r"{LEADER}(?:TODO|FIXME):\s*(?P<description>.*?)(?:\s+by\s+(?P<writer>[\w.-]+))?{TAIL}"
            ),
            format!(
                r"{LEADER}(?:TODO|FIXME)\((?P<writer>[^)]*)\):\s*(?P<description>.*?){TAIL}"
            ),
        ]
    }

    pub fn note() -> Vec<String> {
        vec![format!(
            r"{LEADER}NOTE(?:\((?P<writer>[^)]*)\))?:\s*(?P<description>.*?){TAIL}"
        )]
    }
}

//! @ai:module:intent Define data structures for recognised marks
//! @ai:module:layer domain
//! @ai:module:public_api Mark, MarkKind, MarkFields, Location, Position, CategoryFilter
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// @ai:intent Category of a mark; declaration order is classification priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    Section,
    Todo,
    Note,
}

impl MarkKind {
    /// Classification order. A line belongs to the first kind that matches it.
    pub const PRIORITY: [MarkKind; 3] = [MarkKind::Section, MarkKind::Todo, MarkKind::Note];

    /// @ai:intent Get the configuration key for this kind
    /// @ai:effects pure
    pub fn key(&self) -> &'static str {
        match self {
            MarkKind::Section => "section",
            MarkKind::Todo => "todo",
            MarkKind::Note => "note",
        }
    }

    /// @ai:intent Get the human-facing name for this kind
    /// @ai:effects pure
    pub fn name(&self) -> &'static str {
        match self {
            MarkKind::Section => "Section",
            MarkKind::Todo => "TODO",
            MarkKind::Note => "Note",
        }
    }

    /// @ai:intent Get the icon text shown in front of a mark label
    /// @ai:effects pure
    pub fn icon(&self) -> &'static str {
        match self {
            MarkKind::Section => "§",
            MarkKind::Todo => "☐",
            MarkKind::Note => "✎",
        }
    }

    /// @ai:intent Check whether marks of this kind may carry a writer
    pub fn has_writer(&self) -> bool {
        !matches!(self, MarkKind::Section)
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MarkKind {
    type Err = String;

    /// @ai:example ("todo") -> Ok(Todo)
    /// @ai:example ("mark") -> Ok(Section)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "section" | "mark" => Ok(MarkKind::Section),
            "todo" => Ok(MarkKind::Todo),
            "note" => Ok(MarkKind::Note),
            other => Err(format!("unknown mark category `{}`", other)),
        }
    }
}

/// @ai:intent Represents where a mark was found
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub document: PathBuf,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl Location {
    /// @ai:intent Create a location spanning a whole line
    /// @ai:post start == 0 && end == number of chars in line_text
    pub fn whole_line(document: &Path, line: usize, line_text: &str) -> Self {
        Self {
            document: document.to_path_buf(),
            line,
            start: 0,
            end: line_text.chars().count(),
        }
    }

    /// @ai:intent Position at the end of the span, where the cursor lands on selection
    pub fn end_position(&self) -> Position {
        Position::new(self.line, self.end)
    }
}

/// @ai:intent A zero-based cursor position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// @ai:intent Fields extracted from one successful pattern match
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkFields {
    pub heading: usize,
    pub description: String,
    pub writer: Option<String>,
}

/// @ai:intent One recognised annotation occurrence; immutable once built
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mark {
    kind: MarkKind,
    location: Location,
    heading: usize,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    writer: Option<String>,
}

impl Mark {
    /// @ai:intent Build a mark from a classification result
    /// @ai:post section marks never carry a writer
    pub fn new(kind: MarkKind, location: Location, fields: MarkFields) -> Self {
        let writer = if kind.has_writer() { fields.writer } else { None };
        Self {
            kind,
            location,
            heading: fields.heading,
            description: fields.description,
            writer,
        }
    }

    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn heading(&self) -> usize {
        self.heading
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn writer(&self) -> Option<&str> {
        self.writer.as_deref()
    }
}

/// @ai:intent Set of requested mark kinds; empty means every kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    kinds: Vec<MarkKind>,
}

impl CategoryFilter {
    /// @ai:intent A filter that accepts every kind
    pub fn all() -> Self {
        Self::default()
    }

    /// @ai:intent Build a filter from requested kinds, dropping duplicates
    pub fn of(kinds: impl IntoIterator<Item = MarkKind>) -> Self {
        let mut collected: Vec<MarkKind> = Vec::new();
        for kind in kinds {
            if !collected.contains(&kind) {
                collected.push(kind);
            }
        }
        collected.sort();
        Self { kinds: collected }
    }

    /// @ai:intent Check whether the filter admits a kind
    /// @ai:example (empty filter, Note) -> true
    pub fn admits(&self, kind: MarkKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    /// @ai:intent True when TODO is the only requested kind
    pub fn is_todo_only(&self) -> bool {
        self.kinds == [MarkKind::Todo]
    }

    pub fn kinds(&self) -> &[MarkKind] {
        &self.kinds
    }
}

//! @ai:module:intent Turn marks into picker items and format them for output
//! @ai:module:layer infrastructure
//! @ai:module:public_api PickItem, PresentationOptions, present_mark, OutputFormat, format_marks, format_status, to_json
//! @ai:module:depends_on mark, status, config
//! @ai:module:stateless true

use crate::config::Config;
use crate::mark::{Location, Mark, MarkKind};
use crate::status::StatusSummary;
use colored::Colorize;
use serde::Serialize;

/// @ai:intent One row handed to the picker surface
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: String,
    pub detail: String,
    pub location: Location,
}

/// @ai:intent Presentation settings taken from configuration
#[derive(Debug, Clone)]
pub struct PresentationOptions {
    pub heading_symbol: String,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            heading_symbol: "#".to_string(),
        }
    }
}

impl From<&Config> for PresentationOptions {
    fn from(config: &Config) -> Self {
        Self {
            heading_symbol: config.heading_symbol.clone(),
        }
    }
}

/// @ai:intent Map a mark to its label/description/detail triple
/// @ai:example (section, heading 2, "Setup") -> label "## § Setup"
/// @ai:example (todo at line 4 of src/a.rs, writer alice) -> description "TODO @alice", detail "a.rs:5"
/// @ai:effects pure
pub fn present_mark(mark: &Mark, options: &PresentationOptions) -> PickItem {
    let mut label = String::new();
    if mark.heading() > 0 {
        label.push_str(&options.heading_symbol.repeat(mark.heading()));
        label.push(' ');
    }
    label.push_str(mark.kind().icon());
    if !mark.description().is_empty() {
        label.push(' ');
        label.push_str(mark.description());
    }

    let description = match mark.writer() {
        Some(writer) => format!("{} @{}", mark.kind().name(), writer),
        None => mark.kind().name().to_string(),
    };

    PickItem {
        label,
        description,
        detail: detail_for(mark.location()),
        location: mark.location().clone(),
    }
}

fn detail_for(location: &Location) -> String {
    let basename = location
        .document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.document.display().to_string());
    format!("{}:{}", basename, location.line + 1)
}

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format a mark list as a string
/// @ai:effects pure
pub fn format_marks(marks: &[Mark], format: OutputFormat, options: &PresentationOptions) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(marks).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(marks).unwrap_or_default(),
        OutputFormat::Text => format_marks_text(marks, options),
    }
}

/// @ai:intent Human-readable listing grouped by document
/// @ai:effects pure
fn format_marks_text(marks: &[Mark], options: &PresentationOptions) -> String {
    let mut output = String::new();
    let mut current: Option<&std::path::Path> = None;

    for mark in marks {
        let document = mark.location().document.as_path();
        if current != Some(document) {
            if current.is_some() {
                output.push('\n');
            }
            output.push_str(&format!("{}\n", document.display().to_string().bold()));
            current = Some(document);
        }

        let item = present_mark(mark, options);
        let label = match mark.kind() {
            MarkKind::Section => item.label.cyan().bold(),
            MarkKind::Todo => item.label.yellow(),
            MarkKind::Note => item.label.green(),
        };
        output.push_str(&format!(
            "  {}  {}  {}\n",
            format!("{:>5}", mark.line() + 1).dimmed(),
            label,
            item.description.dimmed()
        ));
    }

    output
}

/// @ai:intent Render the status summary, e.g. "§ 2  ☐ 3  ✎ 1"
/// @ai:effects pure
pub fn format_status(summary: &StatusSummary) -> String {
    MarkKind::PRIORITY
        .iter()
        .map(|kind| format!("{} {}", kind.icon(), summary.count(*kind)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::MarkFields;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn mark(kind: MarkKind, line: usize, heading: usize, description: &str, writer: Option<&str>) -> Mark {
        Mark::new(
            kind,
            Location::whole_line(Path::new("src/app/main.rs"), line, "// placeholder"),
            MarkFields {
                heading,
                description: description.to_string(),
                writer: writer.map(str::to_string),
            },
        )
    }

    #[test]
    fn test_section_label_with_heading() {
        let item = present_mark(
            &mark(MarkKind::Section, 0, 2, "Setup", None),
            &PresentationOptions::default(),
        );
        assert_eq!(item.label, "## § Setup");
        assert_eq!(item.description, "Section");
        assert_eq!(item.detail, "main.rs:1");
    }

    #[test]
    fn test_todo_with_writer() {
        let item = present_mark(
            &mark(MarkKind::Todo, 4, 0, "fix bug", Some("alice")),
            &PresentationOptions::default(),
        );
        assert_eq!(item.label, "☐ fix bug");
        assert_eq!(item.description, "TODO @alice");
        assert_eq!(item.detail, "main.rs:5");
    }

    #[test]
    fn test_custom_heading_symbol() {
        let options = PresentationOptions {
            heading_symbol: "-".to_string(),
        };
        let item = present_mark(&mark(MarkKind::Section, 0, 3, "", None), &options);
        assert_eq!(item.label, "--- §");
    }

    #[test]
    fn test_json_output_contains_fields() {
        let marks = vec![mark(MarkKind::Note, 2, 0, "remember", Some("bob"))];
        let json = format_marks(&marks, OutputFormat::Json, &PresentationOptions::default());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "note");
        assert_eq!(value[0]["writer"], "bob");
        assert_eq!(value[0]["location"]["line"], 2);
    }

    #[test]
    fn test_text_output_uses_one_based_lines() {
        colored::control::set_override(false);
        let marks = vec![mark(MarkKind::Todo, 9, 0, "later", None)];
        let text = format_marks(&marks, OutputFormat::Text, &PresentationOptions::default());
        assert!(text.contains("src/app/main.rs"));
        assert!(text.contains("   10  ☐ later  TODO"));
    }

    #[test]
    fn test_status_text() {
        let summary = StatusSummary {
            sections: 2,
            todos: 3,
            notes: 0,
        };
        assert_eq!(format_status(&summary), "§ 2  ☐ 3  ✎ 0");
    }
}

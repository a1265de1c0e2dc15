//! @ai:module:intent Terminal implementations of the editor host and picker used by the CLI
//! @ai:module:layer presentation
//! @ai:module:public_api TerminalHost, LinePicker
//! @ai:module:depends_on navigation, scanner, presentation
//! @ai:module:stateless false

use crate::config::Theme;
use crate::mark::{Location, Position};
use crate::navigation::{EditorHost, Picker, PickerEvent, ViewSnapshot};
use crate::presentation::PickItem;
use crate::scanner::{Document, TextDocument};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const VIEW_HEIGHT: usize = 24;

/// @ai:intent Editor host over documents loaded from disk; reveals print a one-line preview
pub struct TerminalHost<W: Write> {
    documents: Vec<TextDocument>,
    active: Option<usize>,
    cursor: Position,
    top_line: usize,
    highlight: Option<(Location, String)>,
    theme: Theme,
    out: W,
}

impl<W: Write> TerminalHost<W> {
    /// @ai:intent Host with no open document
    pub fn empty(out: W) -> Self {
        Self {
            documents: Vec::new(),
            active: None,
            cursor: Position::default(),
            top_line: 0,
            highlight: None,
            theme: Theme::default(),
            out,
        }
    }

    /// @ai:intent Host with one active document and the cursor at `cursor`
    pub fn with_document(document: TextDocument, cursor: Position, out: W) -> Self {
        Self {
            documents: vec![document],
            active: Some(0),
            cursor,
            top_line: cursor.line.saturating_sub(VIEW_HEIGHT / 2),
            highlight: None,
            theme: Theme::default(),
            out,
        }
    }

    /// @ai:intent Pick the theme that decides the highlight colour
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn cursor_position(&self) -> Position {
        self.cursor
    }

    /// @ai:intent Current highlight and its colour, if any
    pub fn highlighted(&self) -> Option<(&Location, &str)> {
        self.highlight.as_ref().map(|(l, c)| (l, c.as_str()))
    }

    fn find(&self, path: &Path) -> Option<usize> {
        self.documents.iter().position(|d| d.identity() == path)
    }
}

impl<W: Write> EditorHost for TerminalHost<W> {
    type Doc = TextDocument;

    fn active_document(&self) -> Option<&TextDocument> {
        self.active.and_then(|i| self.documents.get(i))
    }

    fn cursor(&self) -> Option<Position> {
        self.active.map(|_| self.cursor)
    }

    fn snapshot(&self) -> Option<ViewSnapshot> {
        let document = self.active_document()?;
        Some(ViewSnapshot {
            document: document.identity().to_path_buf(),
            cursor: self.cursor,
            top_line: self.top_line,
        })
    }

    fn restore(&mut self, snapshot: &ViewSnapshot) {
        self.active = self.find(&snapshot.document).or(self.active);
        self.cursor = snapshot.cursor;
        self.top_line = snapshot.top_line;
    }

    /// @ai:effects fs:read
    fn open_document(&mut self, path: &Path, _preview: bool) -> bool {
        if let Some(index) = self.find(path) {
            self.active = Some(index);
            return true;
        }
        let loaded = std::fs::read(path)
            .map_err(|e| crate::error::Error::FileRead {
                path: path.to_path_buf(),
                source: e,
            })
            .and_then(|bytes| TextDocument::from_bytes(path, bytes));
        match loaded {
            Ok(document) => {
                self.documents.push(document);
                self.active = Some(self.documents.len() - 1);
                true
            }
            Err(e) => {
                tracing::warn!("Cannot open document: {}", e);
                false
            }
        }
    }

    fn reveal(&mut self, location: &Location) {
        self.top_line = location.line.saturating_sub(VIEW_HEIGHT / 2);
        let text = self
            .active_document()
            .and_then(|d| d.line_text(location.line))
            .unwrap_or_default()
            .trim()
            .to_string();
        writeln!(
            self.out,
            "  {} {}:{}  {}",
            "→".cyan(),
            location.document.display(),
            location.line + 1,
            text.dimmed()
        )
        .ok();
    }

    fn set_cursor(&mut self, position: Position) {
        self.cursor = position;
    }

    fn set_highlight(&mut self, location: &Location, color: &str) {
        self.highlight = Some((location.clone(), color.to_string()));
    }

    fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    fn theme(&self) -> Theme {
        self.theme
    }
}

/// @ai:intent Line-driven picker: `N` accepts item N, `?N` previews it, an empty line cancels
pub struct LinePicker<R, W> {
    input: R,
    out: W,
    count: usize,
}

impl<R: AsyncBufRead + Unpin, W: Write> LinePicker<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            count: 0,
        }
    }

    /// @ai:intent Parse one input line into an event; None for unrecognised input
    /// @ai:example ("3") -> Some(Accept(2))
    /// @ai:example ("?1") -> Some(Hover(0))
    /// @ai:example ("") -> Some(Dismiss)
    fn parse(&self, line: &str) -> Option<PickerEvent> {
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("q") {
            return Some(PickerEvent::Dismiss);
        }
        let (hover, number) = match line.strip_prefix('?') {
            Some(rest) => (true, rest.trim()),
            None => (false, line),
        };
        let index = number.parse::<usize>().ok()?.checked_sub(1)?;
        if index >= self.count {
            return None;
        }
        Some(if hover {
            PickerEvent::Hover(index)
        } else {
            PickerEvent::Accept(index)
        })
    }
}

impl<R: AsyncBufRead + Unpin, W: Write> Picker for LinePicker<R, W> {
    fn show(&mut self, items: &[PickItem], initial: Option<usize>) {
        self.count = items.len();
        for (i, item) in items.iter().enumerate() {
            let marker = if Some(i) == initial { ">" } else { " " };
            writeln!(
                self.out,
                "{}{:>3}. {}  {}  {}",
                marker,
                i + 1,
                item.label,
                item.description.dimmed(),
                item.detail.dimmed()
            )
            .ok();
        }
    }

    async fn next_event(&mut self) -> PickerEvent {
        loop {
            write!(self.out, "jump [1-{}, ?N preview, enter cancels]: ", self.count).ok();
            self.out.flush().ok();

            let mut line = String::new();
            match self.input.read_line(&mut line).await {
                Ok(0) | Err(_) => return PickerEvent::Dismiss,
                Ok(_) => {}
            }
            match self.parse(&line) {
                Some(event) => return event,
                None => {
                    writeln!(self.out, "not a valid choice: {}", line.trim()).ok();
                }
            }
        }
    }
}

/// @ai:intent Render a location the way editors accept it on the command line
pub fn location_arg(path: &Path, position: Position) -> String {
    format!("{}:{}:{}", path.display(), position.line + 1, position.column + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mark::CategoryFilter;
    use crate::classifier::ClassifierSet;
    use crate::mark::{MarkFields, MarkKind};
    use crate::navigation::{NavigationState, PresentOutcome};
    use crate::Mark;
    use crate::scanner::{scan, ScanMode};
    use tempfile::TempDir;

    fn presenting(host: &TerminalHost<Vec<u8>>) -> NavigationState {
        let classifiers = ClassifierSet::from_config(&Config::default(), &CategoryFilter::all());
        let marks = scan(host.active_document().unwrap(), &classifiers, ScanMode::Full);
        let mut state = NavigationState::new(host.cursor());
        state.begin_scan();
        state.complete_scan(marks, &CategoryFilter::all());
        state
    }

    #[test]
    fn test_parse_choices() {
        let mut picker = LinePicker::new(&b""[..], Vec::new());
        picker.count = 3;
        assert_eq!(picker.parse("2\n"), Some(PickerEvent::Accept(1)));
        assert_eq!(picker.parse("?3"), Some(PickerEvent::Hover(2)));
        assert_eq!(picker.parse("\n"), Some(PickerEvent::Dismiss));
        assert_eq!(picker.parse("4"), None);
        assert_eq!(picker.parse("0"), None);
        assert_eq!(picker.parse("x"), None);
    }

    #[tokio::test]
    async fn test_picker_selects_from_input() {
        let doc = TextDocument::new("a.rs", "// TODO: one\ncode\n// NOTE: two");
        let mut host = TerminalHost::with_document(doc, Position::new(1, 0), Vec::new());
        let mut state = presenting(&host);
        let mut picker = LinePicker::new(&b"?1\nnope\n2\n"[..], Vec::new());

        let outcome = state.present(&mut host, &mut picker, &Config::default()).await;

        assert!(matches!(outcome, PresentOutcome::Selected(ref m) if m.line() == 2));
        assert_eq!(host.cursor_position(), Position::new(2, 12));
        assert!(host.highlighted().is_none());
        let shown = String::from_utf8(picker.out).unwrap();
        assert!(shown.contains("not a valid choice: nope"));
    }

    #[tokio::test]
    async fn test_end_of_input_cancels_and_restores() {
        let doc = TextDocument::new("a.rs", "// TODO: one\ncode\n// NOTE: two");
        let mut host = TerminalHost::with_document(doc, Position::new(1, 2), Vec::new());
        let before = host.snapshot();
        let mut state = presenting(&host);
        let mut picker = LinePicker::new(&b"?2\n"[..], Vec::new());

        let outcome = state.present(&mut host, &mut picker, &Config::default()).await;

        assert_eq!(outcome, PresentOutcome::Cancelled);
        assert_eq!(host.snapshot(), before);
    }

    #[test]
    fn test_open_and_restore_across_documents() {
        let temp = TempDir::new().unwrap();
        let other = temp.path().join("other.rs");
        std::fs::write(&other, "// NOTE: elsewhere").unwrap();

        let doc = TextDocument::new("a.rs", "code");
        let mut host = TerminalHost::with_document(doc, Position::new(0, 1), Vec::new());
        let before = host.snapshot().unwrap();

        assert!(host.open_document(&other, true));
        assert_eq!(host.active_path(), Some(other.clone()));
        assert!(!host.open_document(&temp.path().join("missing.rs"), true));

        host.restore(&before);
        assert_eq!(host.snapshot().unwrap(), before);
    }

    #[test]
    fn test_location_arg_is_one_based() {
        assert_eq!(location_arg(Path::new("a.rs"), Position::new(0, 4)), "a.rs:1:5");
    }

    #[tokio::test]
    async fn test_accepting_mark_in_missing_file_keeps_cursor() {
        let doc = TextDocument::new("a.rs", "code
more code");
        let mut host = TerminalHost::with_document(doc, Position::new(1, 0), Vec::new());
        let gone = Mark::new(
            MarkKind::Todo,
            Location::whole_line(Path::new("/nonexistent/gone.rs"), 6, "// TODO: vanished"),
            MarkFields::default(),
        );
        let mut state = NavigationState::new(host.cursor());
        state.begin_scan();
        state.complete_scan(vec![gone], &CategoryFilter::all());
        let mut picker = LinePicker::new(&b"?1\n1\n"[..], Vec::new());

        let outcome = state.present(&mut host, &mut picker, &Config::default()).await;

        assert_eq!(outcome, PresentOutcome::Cancelled);
        assert_eq!(host.active_path(), Some(Path::new("a.rs").to_path_buf()));
        assert_eq!(host.cursor_position(), Position::new(1, 0));
        assert!(host.highlighted().is_none());
        assert!(host.out.is_empty());
    }

    #[test]
    fn test_light_theme_picks_light_highlight() {
        let config = Config::default();
        let doc = TextDocument::new("a.rs", "// NOTE: here");
        let mut host =
            TerminalHost::with_document(doc, Position::default(), Vec::new()).with_theme(Theme::Light);
        let location = Location::whole_line(Path::new("a.rs"), 0, "// NOTE: here");

        host.set_highlight(&location, config.highlight_color(host.theme()));

        assert_eq!(host.highlighted(), Some((&location, "rgba(0, 0, 0, 0.1)")));
    }
}

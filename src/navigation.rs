//! @ai:module:intent Drive one navigation command: scan, present, select or cancel, and next/previous jumps with wraparound
//! @ai:module:layer application
//! @ai:module:public_api NavigationState, NavPhase, PresentOutcome, EditorHost, Picker, PickerEvent, ViewSnapshot, next_target, previous_target, no_marks_message
//! @ai:module:depends_on scanner, classifier, presentation, config
//! @ai:module:stateless false

use crate::classifier::ClassifierSet;
use crate::config::{Config, Theme};
use crate::mark::{CategoryFilter, Location, Mark, Position};
use crate::presentation::{present_mark, PickItem, PresentationOptions};
use crate::scanner::{scan, Document, ScanMode};
use std::path::{Path, PathBuf};

/// @ai:intent Everything needed to put the view back where it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub document: PathBuf,
    pub cursor: Position,
    pub top_line: usize,
}

/// @ai:intent The editor the command acts on, including its reveal/highlight surface
pub trait EditorHost {
    type Doc: Document;

    /// @ai:intent The live document, None when no editor is active
    fn active_document(&self) -> Option<&Self::Doc>;

    fn cursor(&self) -> Option<Position>;

    fn snapshot(&self) -> Option<ViewSnapshot>;

    /// @ai:intent Return selection and viewport to a snapshot exactly
    fn restore(&mut self, snapshot: &ViewSnapshot);

    /// @ai:intent Open another document; `preview` keeps it transient
    fn open_document(&mut self, path: &Path, preview: bool) -> bool;

    /// @ai:intent Scroll a location into the centre of the view
    fn reveal(&mut self, location: &Location);

    fn set_cursor(&mut self, position: Position);

    fn set_highlight(&mut self, location: &Location, color: &str);

    fn clear_highlight(&mut self);

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn active_path(&self) -> Option<PathBuf> {
        self.active_document().map(|d| d.identity().to_path_buf())
    }
}

/// @ai:intent What the picker reports back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerEvent {
    Hover(usize),
    Accept(usize),
    Dismiss,
}

/// @ai:intent Selectable list surface
#[allow(async_fn_in_trait)]
pub trait Picker {
    fn show(&mut self, items: &[PickItem], initial: Option<usize>);

    /// @ai:intent Wait for the next hover, acceptance or dismissal
    async fn next_event(&mut self) -> PickerEvent;
}

/// @ai:intent Lifecycle of one navigation command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    ScanPending,
    Presenting,
    Selected,
    Cancelled,
}

/// @ai:intent Terminal result of a presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentOutcome {
    Selected(Mark),
    Cancelled,
}

/// @ai:intent Per-command navigation state; created fresh and dropped when the command ends
#[derive(Debug)]
pub struct NavigationState {
    phase: NavPhase,
    marks: Vec<Mark>,
    reference: Option<Position>,
    saved: Option<ViewSnapshot>,
}

impl NavigationState {
    /// @ai:intent Start in Idle with the caller's cursor as reference
    pub fn new(reference: Option<Position>) -> Self {
        Self {
            phase: NavPhase::Idle,
            marks: Vec::new(),
            reference,
            saved: None,
        }
    }

    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// @ai:intent Idle -> ScanPending
    /// @ai:edge_cases called in any other phase -> logged, phase unchanged
    pub fn begin_scan(&mut self) {
        if self.phase != NavPhase::Idle {
            tracing::warn!("Scan requested while {:?}", self.phase);
            return;
        }
        self.phase = NavPhase::ScanPending;
    }

    /// @ai:intent ScanPending -> Presenting, or back to Idle with a message when nothing was found
    /// @ai:post Some(message) iff marks is empty
    pub fn complete_scan(&mut self, marks: Vec<Mark>, filter: &CategoryFilter) -> Option<String> {
        if marks.is_empty() {
            self.phase = NavPhase::Idle;
            return Some(no_marks_message(filter).to_string());
        }
        self.marks = marks;
        self.phase = NavPhase::Presenting;
        None
    }

    /// @ai:intent Index of the last mark at or above the reference line in its document
    pub fn initial_index(&self, active: Option<&Path>) -> Option<usize> {
        let reference = self.reference?;
        let active = active?;
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, m)| m.location().document == active && m.line() <= reference.line)
            .map(|(i, _)| i)
            .last()
    }

    /// @ai:intent Show the marks and follow picker events until selection or dismissal
    /// @ai:pre phase == Presenting
    /// @ai:post highlight is cleared on every exit path
    /// @ai:post Cancelled restores the snapshot captured before showing
    /// @ai:edge_cases target document cannot be opened -> hover is ignored, accept is Cancelled
    pub async fn present<H, P>(&mut self, host: &mut H, picker: &mut P, config: &Config) -> PresentOutcome
    where
        H: EditorHost,
        P: Picker,
    {
        let options = PresentationOptions::from(config);
        let items: Vec<PickItem> = self.marks.iter().map(|m| present_mark(m, &options)).collect();

        self.saved = host.snapshot();
        let origin = host.active_path();
        picker.show(&items, self.initial_index(origin.as_deref()));
        let color = config.highlight_color(host.theme()).to_string();

        loop {
            match picker.next_event().await {
                PickerEvent::Hover(index) => {
                    let Some(mark) = self.marks.get(index) else {
                        continue;
                    };
                    host.clear_highlight();
                    if host.active_path().as_deref() != Some(mark.location().document.as_path())
                        && !host.open_document(&mark.location().document, true)
                    {
                        continue;
                    }
                    host.reveal(mark.location());
                    host.set_highlight(mark.location(), &color);
                }
                PickerEvent::Accept(index) => {
                    let Some(mark) = self.marks.get(index).cloned() else {
                        continue;
                    };
                    host.clear_highlight();
                    let target = mark.location().document.as_path();
                    let foreign = origin.as_deref() != Some(target);
                    if (foreign || host.active_path().as_deref() != Some(target))
                        && !host.open_document(target, !config.always_open_document)
                    {
                        tracing::warn!("Cannot open {}, leaving the view as it was", target.display());
                        return self.cancel(host);
                    }
                    host.reveal(mark.location());
                    host.set_cursor(mark.location().end_position());
                    self.phase = NavPhase::Selected;
                    tracing::info!("Jumped to {}:{}", target.display(), mark.line() + 1);
                    return PresentOutcome::Selected(mark);
                }
                PickerEvent::Dismiss => return self.cancel(host),
            }
        }
    }

    /// @ai:intent Put the view back and end the presentation as cancelled
    fn cancel<H: EditorHost>(&mut self, host: &mut H) -> PresentOutcome {
        host.clear_highlight();
        if let Some(saved) = &self.saved {
            host.restore(saved);
        }
        self.phase = NavPhase::Cancelled;
        PresentOutcome::Cancelled
    }
}

/// @ai:intent Informational text for an empty result
/// @ai:example (todo-only filter) -> "No TODOs left"
pub fn no_marks_message(filter: &CategoryFilter) -> &'static str {
    if filter.is_todo_only() {
        "No TODOs left"
    } else {
        "No marks found"
    }
}

/// @ai:intent Next mark after the cursor line, wrapping to the top once
/// @ai:post None iff the document has no mark at all
/// @ai:effects pure
pub fn next_target<D: Document + ?Sized>(doc: &D, classifiers: &ClassifierSet, cursor_line: usize) -> Option<Mark> {
    if doc.line_count() == 0 {
        return None;
    }
    scan(doc, classifiers, ScanMode::forward(cursor_line + 1, 1))
        .into_iter()
        .next()
        .or_else(|| {
            scan(doc, classifiers, ScanMode::forward(0, 1))
                .into_iter()
                .next()
        })
}

/// @ai:intent Previous mark before the cursor line, wrapping to the bottom once
/// @ai:post None iff the document has no mark at all
/// @ai:effects pure
pub fn previous_target<D: Document + ?Sized>(
    doc: &D,
    classifiers: &ClassifierSet,
    cursor_line: usize,
) -> Option<Mark> {
    let count = doc.line_count();
    if count == 0 {
        return None;
    }
    let before = match cursor_line.checked_sub(1) {
        Some(start) => scan(doc, classifiers, ScanMode::backward(start, 1)),
        None => Vec::new(),
    };
    before.into_iter().next().or_else(|| {
        scan(doc, classifiers, ScanMode::backward(count - 1, 1))
            .into_iter()
            .next()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::MarkKind;
    use crate::scanner::TextDocument;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    fn all() -> ClassifierSet {
        ClassifierSet::from_config(&Config::default(), &CategoryFilter::all())
    }

    fn doc() -> TextDocument {
        TextDocument::new(
            "a.rs",
            "fn main() {}\n// TODO: first\ncode\ncode\n// NOTE: second\ncode",
        )
    }

    #[test]
    fn test_next_moves_forward() {
        assert_eq!(next_target(&doc(), &all(), 1).unwrap().line(), 4);
    }

    #[test]
    fn test_next_wraps_to_top() {
        assert_eq!(next_target(&doc(), &all(), 4).unwrap().line(), 1);
    }

    #[test]
    fn test_previous_moves_backward() {
        assert_eq!(previous_target(&doc(), &all(), 4).unwrap().line(), 1);
    }

    #[test]
    fn test_previous_wraps_to_bottom() {
        assert_eq!(previous_target(&doc(), &all(), 1).unwrap().line(), 4);
        assert_eq!(previous_target(&doc(), &all(), 0).unwrap().line(), 4);
    }

    #[test]
    fn test_no_marks_is_noop() {
        let plain = TextDocument::new("p.rs", "a\nb\nc");
        assert_eq!(next_target(&plain, &all(), 1), None);
        assert_eq!(previous_target(&plain, &all(), 1), None);
    }

    #[test]
    fn test_single_mark_on_cursor_line_is_reached_by_wrap() {
        let single = TextDocument::new("s.rs", "x\n// TODO: only\ny");
        assert_eq!(next_target(&single, &all(), 1).unwrap().line(), 1);
        assert_eq!(previous_target(&single, &all(), 1).unwrap().line(), 1);
    }

    #[test]
    fn test_empty_scan_returns_to_idle_with_message() {
        let mut state = NavigationState::new(None);
        state.begin_scan();
        assert_eq!(state.phase(), NavPhase::ScanPending);

        let todo_only = CategoryFilter::of([MarkKind::Todo]);
        assert_eq!(state.complete_scan(Vec::new(), &todo_only).as_deref(), Some("No TODOs left"));
        assert_eq!(state.phase(), NavPhase::Idle);

        state.begin_scan();
        assert_eq!(
            state.complete_scan(Vec::new(), &CategoryFilter::all()).as_deref(),
            Some("No marks found")
        );
    }

    #[derive(Default)]
    struct FakeHost {
        doc: Option<TextDocument>,
        cursor: Position,
        top_line: usize,
        highlighted: Option<Location>,
        opened: Vec<(PathBuf, bool)>,
        revealed: Vec<usize>,
        fail_open: bool,
    }

    impl EditorHost for FakeHost {
        type Doc = TextDocument;

        fn active_document(&self) -> Option<&TextDocument> {
            self.doc.as_ref()
        }

        fn cursor(&self) -> Option<Position> {
            Some(self.cursor)
        }

        fn snapshot(&self) -> Option<ViewSnapshot> {
            let doc = self.doc.as_ref()?;
            Some(ViewSnapshot {
                document: doc.identity().to_path_buf(),
                cursor: self.cursor,
                top_line: self.top_line,
            })
        }

        fn restore(&mut self, snapshot: &ViewSnapshot) {
            self.cursor = snapshot.cursor;
            self.top_line = snapshot.top_line;
        }

        fn open_document(&mut self, path: &Path, preview: bool) -> bool {
            self.opened.push((path.to_path_buf(), preview));
            !self.fail_open
        }

        fn reveal(&mut self, location: &Location) {
            self.top_line = location.line.saturating_sub(2);
            self.revealed.push(location.line);
        }

        fn set_cursor(&mut self, position: Position) {
            self.cursor = position;
        }

        fn set_highlight(&mut self, location: &Location, _color: &str) {
            self.highlighted = Some(location.clone());
        }

        fn clear_highlight(&mut self) {
            self.highlighted = None;
        }
    }

    struct ScriptedPicker {
        events: VecDeque<PickerEvent>,
        shown: usize,
        initial: Option<usize>,
    }

    impl ScriptedPicker {
        fn new(events: &[PickerEvent]) -> Self {
            Self {
                events: events.iter().copied().collect(),
                shown: 0,
                initial: None,
            }
        }
    }

    impl Picker for ScriptedPicker {
        fn show(&mut self, items: &[PickItem], initial: Option<usize>) {
            self.shown = items.len();
            self.initial = initial;
        }

        async fn next_event(&mut self) -> PickerEvent {
            self.events.pop_front().unwrap_or(PickerEvent::Dismiss)
        }
    }

    fn presenting(host: &FakeHost) -> NavigationState {
        let doc = host.doc.as_ref().unwrap();
        let mut state = NavigationState::new(host.cursor());
        state.begin_scan();
        let marks = scan(doc, &all(), ScanMode::Full);
        assert_eq!(state.complete_scan(marks, &CategoryFilter::all()), None);
        state
    }

    #[tokio::test]
    async fn test_cancel_restores_exact_view() {
        let mut host = FakeHost {
            doc: Some(doc()),
            cursor: Position::new(2, 3),
            top_line: 0,
            ..Default::default()
        };
        let before = host.snapshot();
        let mut state = presenting(&host);
        let mut picker = ScriptedPicker::new(&[
            PickerEvent::Hover(1),
            PickerEvent::Hover(0),
            PickerEvent::Dismiss,
        ]);

        let outcome = state.present(&mut host, &mut picker, &Config::default()).await;

        assert_eq!(outcome, PresentOutcome::Cancelled);
        assert_eq!(state.phase(), NavPhase::Cancelled);
        assert_eq!(host.revealed, vec![4, 1]);
        assert_eq!(host.snapshot(), before);
        assert_eq!(host.highlighted, None);
        assert!(host.opened.is_empty());
    }

    #[tokio::test]
    async fn test_select_moves_cursor_to_span_end() {
        let mut host = FakeHost {
            doc: Some(doc()),
            cursor: Position::new(2, 0),
            ..Default::default()
        };
        let mut state = presenting(&host);
        let mut picker = ScriptedPicker::new(&[PickerEvent::Hover(0), PickerEvent::Accept(1)]);

        let outcome = state.present(&mut host, &mut picker, &Config::default()).await;

        let PresentOutcome::Selected(mark) = outcome else {
            panic!("expected a selection");
        };
        assert_eq!(mark.kind(), MarkKind::Note);
        assert_eq!(host.cursor, Position::new(4, "// NOTE: second".len()));
        assert_eq!(host.highlighted, None);
        assert_eq!(state.phase(), NavPhase::Selected);
        assert_eq!(picker.shown, 2);
        assert_eq!(picker.initial, Some(0));
    }

    #[tokio::test]
    async fn test_selecting_project_mark_opens_document() {
        let mut host = FakeHost {
            doc: Some(doc()),
            ..Default::default()
        };
        let other = Mark::new(
            MarkKind::Todo,
            Location::whole_line(Path::new("b.rs"), 7, "// TODO: there"),
            crate::mark::MarkFields::default(),
        );
        let mut state = NavigationState::new(host.cursor());
        state.begin_scan();
        state.complete_scan(vec![other], &CategoryFilter::all());

        let mut picker = ScriptedPicker::new(&[PickerEvent::Hover(0), PickerEvent::Accept(0)]);
        let config = Config {
            always_open_document: false,
            ..Default::default()
        };
        state.present(&mut host, &mut picker, &config).await;

        assert_eq!(
            host.opened,
            vec![(PathBuf::from("b.rs"), true), (PathBuf::from("b.rs"), true)]
        );
        assert_eq!(host.cursor, Position::new(7, 14));
    }

    #[tokio::test]
    async fn test_unopenable_document_leaves_view_untouched() {
        let mut host = FakeHost {
            doc: Some(doc()),
            cursor: Position::new(1, 0),
            fail_open: true,
            ..Default::default()
        };
        let before = host.snapshot();
        let gone = Mark::new(
            MarkKind::Todo,
            Location::whole_line(Path::new("/nonexistent/gone.rs"), 6, "// TODO: vanished"),
            crate::mark::MarkFields::default(),
        );
        let mut state = NavigationState::new(host.cursor());
        state.begin_scan();
        state.complete_scan(vec![gone], &CategoryFilter::all());

        let mut picker = ScriptedPicker::new(&[PickerEvent::Hover(0), PickerEvent::Accept(0)]);
        let outcome = state.present(&mut host, &mut picker, &Config::default()).await;

        assert_eq!(outcome, PresentOutcome::Cancelled);
        assert_eq!(state.phase(), NavPhase::Cancelled);
        assert!(host.revealed.is_empty());
        assert_eq!(host.highlighted, None);
        assert_eq!(host.snapshot(), before);
        assert_eq!(host.opened.len(), 2);
    }
}

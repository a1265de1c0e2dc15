//! @ai:module:intent Keep a live per-category mark count and decide when host events require a re-scan
//! @ai:module:layer application
//! @ai:module:public_api StatusSummary, HostEvent, RefreshDecision, StatusTracker
//! @ai:module:depends_on scanner, project, classifier, config
//! @ai:module:stateless false

use crate::classifier::ClassifierSet;
use crate::config::Config;
use crate::mark::{CategoryFilter, Mark, MarkKind};
use crate::presentation::format_status;
use crate::project::{FileLister, FileReader, ProjectScanner};
use crate::scanner::{scan, Document, ScanMode};
use serde::Serialize;
use std::path::PathBuf;

/// @ai:intent Mark counts per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub sections: usize,
    pub todos: usize,
    pub notes: usize,
}

impl StatusSummary {
    /// @ai:intent Count marks by kind
    /// @ai:effects pure
    pub fn from_marks(marks: &[Mark]) -> Self {
        let mut summary = Self::default();
        for mark in marks {
            match mark.kind() {
                MarkKind::Section => summary.sections += 1,
                MarkKind::Todo => summary.todos += 1,
                MarkKind::Note => summary.notes += 1,
            }
        }
        summary
    }

    pub fn count(&self, kind: MarkKind) -> usize {
        match kind {
            MarkKind::Section => self.sections,
            MarkKind::Todo => self.todos,
            MarkKind::Note => self.notes,
        }
    }

    pub fn total(&self) -> usize {
        self.sections + self.todos + self.notes
    }
}

/// @ai:intent Change notifications coming from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ActiveEditorChanged(Option<PathBuf>),
    DocumentEdited(PathBuf),
    DocumentSaved(PathBuf),
    ConfigurationChanged,
    FilesChanged,
}

/// @ai:intent What the tracker wants done after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Ignore,
    Hide,
    Rescan,
}

/// @ai:intent Status item state: the active document, visibility and the last summary
#[derive(Debug, Clone)]
pub struct StatusTracker {
    active: Option<PathBuf>,
    visible: bool,
    summary: StatusSummary,
}

impl StatusTracker {
    pub fn new(config: &Config) -> Self {
        Self {
            active: None,
            visible: config.show_status_item,
            summary: StatusSummary::default(),
        }
    }

    pub fn summary(&self) -> &StatusSummary {
        &self.summary
    }

    /// @ai:intent Status text, None while hidden
    pub fn text(&self) -> Option<String> {
        self.visible.then(|| format_status(&self.summary))
    }

    /// @ai:intent Decide whether an event calls for an incremental re-scan
    /// @ai:post hidden item never asks for a re-scan
    /// @ai:edge_cases edit to a non-active document -> Ignore
    pub fn on_event(&mut self, event: &HostEvent, config: &Config) -> RefreshDecision {
        if let HostEvent::ConfigurationChanged = event {
            let was_visible = self.visible;
            self.visible = config.show_status_item;
            if !self.visible {
                return if was_visible {
                    RefreshDecision::Hide
                } else {
                    RefreshDecision::Ignore
                };
            }
            return RefreshDecision::Rescan;
        }

        if let HostEvent::ActiveEditorChanged(path) = event {
            self.active = path.clone();
        }

        if !self.visible {
            return RefreshDecision::Ignore;
        }

        match event {
            HostEvent::ActiveEditorChanged(_) => RefreshDecision::Rescan,
            HostEvent::DocumentEdited(path) | HostEvent::DocumentSaved(path) => {
                if self.active.as_deref() == Some(path.as_path()) || config.show_project_marks {
                    RefreshDecision::Rescan
                } else {
                    RefreshDecision::Ignore
                }
            }
            HostEvent::FilesChanged if config.show_project_marks => RefreshDecision::Rescan,
            HostEvent::FilesChanged | HostEvent::ConfigurationChanged => RefreshDecision::Ignore,
        }
    }

    /// @ai:intent Recount marks for the active document, plus the project when enabled
    /// @ai:effects fs:read
    pub async fn refresh<D, L, R>(
        &mut self,
        document: Option<&D>,
        project: Option<&ProjectScanner<L, R>>,
        config: &Config,
    ) -> &StatusSummary
    where
        D: Document,
        L: FileLister,
        R: FileReader,
    {
        let classifiers = ClassifierSet::from_config(config, &CategoryFilter::all());
        let mut marks = match document {
            Some(doc) => scan(doc, &classifiers, ScanMode::Full),
            None => Vec::new(),
        };

        if config.show_project_marks {
            if let Some(project) = project {
                let skip = document.map(|d| d.identity());
                marks.extend(project.scan(&config.project, &classifiers, skip).await);
            }
        }

        self.summary = StatusSummary::from_marks(&marks);
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{FsReader, WalkDirLister};
    use crate::scanner::TextDocument;
    use tempfile::TempDir;

    #[test]
    fn test_edits_to_active_document_rescan() {
        let config = Config::default();
        let mut tracker = StatusTracker::new(&config);
        let active = PathBuf::from("a.rs");

        assert_eq!(
            tracker.on_event(&HostEvent::ActiveEditorChanged(Some(active.clone())), &config),
            RefreshDecision::Rescan
        );
        assert_eq!(
            tracker.on_event(&HostEvent::DocumentEdited(active), &config),
            RefreshDecision::Rescan
        );
        assert_eq!(
            tracker.on_event(&HostEvent::DocumentEdited(PathBuf::from("b.rs")), &config),
            RefreshDecision::Ignore
        );
        assert_eq!(
            tracker.on_event(&HostEvent::FilesChanged, &config),
            RefreshDecision::Ignore
        );
    }

    #[test]
    fn test_project_mode_rescans_on_file_changes() {
        let config = Config {
            show_project_marks: true,
            ..Default::default()
        };
        let mut tracker = StatusTracker::new(&config);
        assert_eq!(
            tracker.on_event(&HostEvent::FilesChanged, &config),
            RefreshDecision::Rescan
        );
        assert_eq!(
            tracker.on_event(&HostEvent::DocumentSaved(PathBuf::from("other.rs")), &config),
            RefreshDecision::Rescan
        );
    }

    #[test]
    fn test_hiding_through_configuration() {
        let mut tracker = StatusTracker::new(&Config::default());
        let hidden = Config {
            show_status_item: false,
            ..Default::default()
        };

        assert_eq!(
            tracker.on_event(&HostEvent::ConfigurationChanged, &hidden),
            RefreshDecision::Hide
        );
        assert_eq!(tracker.text(), None);
        assert_eq!(
            tracker.on_event(&HostEvent::ActiveEditorChanged(None), &hidden),
            RefreshDecision::Ignore
        );
        assert_eq!(
            tracker.on_event(&HostEvent::ConfigurationChanged, &Config::default()),
            RefreshDecision::Rescan
        );
    }

    #[tokio::test]
    async fn test_refresh_counts_editor_and_project() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("other.rs"), "// TODO: elsewhere").unwrap();
        let live = temp.path().join("live.rs");
        std::fs::write(&live, "// TODO: stale on disk").unwrap();

        let doc = TextDocument::new(&live, "// SECTION: Top\n// NOTE: n\n// TODO: t");
        let project = ProjectScanner::new(WalkDirLister::new(temp.path()), FsReader);

        let mut tracker = StatusTracker::new(&Config::default());
        let summary = *tracker.refresh(Some(&doc), Some(&project), &Config::default()).await;
        assert_eq!(summary, StatusSummary { sections: 1, todos: 1, notes: 1 });

        let with_project = Config {
            show_project_marks: true,
            ..Default::default()
        };
        let summary = *tracker.refresh(Some(&doc), Some(&project), &with_project).await;
        assert_eq!(summary.todos, 2);
        assert_eq!(summary.total(), 4);
        assert_eq!(tracker.text().unwrap(), "§ 1  ☐ 2  ✎ 1");
    }
}

//! @ai:module:intent Command surface: one entry point per scope and category, dispatched over the host
//! @ai:module:layer application
//! @ai:module:public_api Command, Scope, CommandOutcome, CommandContext, execute
//! @ai:module:depends_on navigation, scanner, project, classifier, config

use crate::classifier::ClassifierSet;
use crate::config::ConfigSource;
use crate::error::{Error, Result};
use crate::mark::{CategoryFilter, Mark, MarkKind};
use crate::navigation::{next_target, previous_target, EditorHost, NavigationState, Picker, PresentOutcome};
use crate::project::{FileLister, FileReader, ProjectScanner};
use crate::scanner::{scan, ScanMode};
use std::fmt;
use std::str::FromStr;

/// @ai:intent Where a jump-to-marks command collects marks from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Editor,
    EditorAndProject,
    Project,
}

impl Scope {
    pub fn includes_editor(&self) -> bool {
        matches!(self, Scope::Editor | Scope::EditorAndProject)
    }

    pub fn includes_project(&self) -> bool {
        matches!(self, Scope::EditorAndProject | Scope::Project)
    }
}

/// @ai:intent A user command, parameterised by the requested categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    JumpToMarks(CategoryFilter),
    JumpToEditorMarks(CategoryFilter),
    JumpToProjectMarks(CategoryFilter),
    JumpToNext(CategoryFilter),
    JumpToPrevious(CategoryFilter),
}

impl Command {
    /// @ai:intent Stable identifier used for binding
    pub fn id(&self) -> &'static str {
        match self {
            Command::JumpToMarks(_) => "markJump.jumpToMarks",
            Command::JumpToEditorMarks(_) => "markJump.jumpToEditorMarks",
            Command::JumpToProjectMarks(_) => "markJump.jumpToProjectMarks",
            Command::JumpToNext(_) => "markJump.jumpToNextMark",
            Command::JumpToPrevious(_) => "markJump.jumpToPreviousMark",
        }
    }

    pub fn filter(&self) -> &CategoryFilter {
        match self {
            Command::JumpToMarks(f)
            | Command::JumpToEditorMarks(f)
            | Command::JumpToProjectMarks(f)
            | Command::JumpToNext(f)
            | Command::JumpToPrevious(f) => f,
        }
    }

    /// @ai:intent Scope for the presenting commands; None for next/previous
    pub fn scope(&self) -> Option<Scope> {
        match self {
            Command::JumpToMarks(_) => Some(Scope::EditorAndProject),
            Command::JumpToEditorMarks(_) => Some(Scope::Editor),
            Command::JumpToProjectMarks(_) => Some(Scope::Project),
            Command::JumpToNext(_) | Command::JumpToPrevious(_) => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())?;
        for kind in self.filter().kinds() {
            write!(f, ":{}", kind)?;
        }
        Ok(())
    }
}

impl FromStr for Command {
    type Err = Error;

    /// @ai:example ("markJump.jumpToNextMark:todo") -> JumpToNext({Todo})
    /// @ai:example ("markJump.jumpToMarks") -> JumpToMarks(all)
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let id = parts.next().unwrap_or_default();
        let kinds = parts
            .map(|p| p.parse::<MarkKind>().map_err(|_| Error::UnknownCommand(s.to_string())))
            .collect::<Result<Vec<_>>>()?;
        let filter = CategoryFilter::of(kinds);

        match id {
            "markJump.jumpToMarks" => Ok(Command::JumpToMarks(filter)),
            "markJump.jumpToEditorMarks" => Ok(Command::JumpToEditorMarks(filter)),
            "markJump.jumpToProjectMarks" => Ok(Command::JumpToProjectMarks(filter)),
            "markJump.jumpToNextMark" => Ok(Command::JumpToNext(filter)),
            "markJump.jumpToPreviousMark" => Ok(Command::JumpToPrevious(filter)),
            _ => Err(Error::UnknownCommand(s.to_string())),
        }
    }
}

/// @ai:intent How a command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// No active document for a command that needs one; silent.
    NoDocument,
    /// Every requested category is disabled.
    NothingConfigured,
    /// Valid scan, nothing found; carries the informational message.
    NoMarks(String),
    Selected(Mark),
    Cancelled,
    /// Next/previous moved the cursor.
    Moved(Mark),
    /// Next/previous found nothing, even after wrapping.
    Unchanged,
}

impl CommandOutcome {
    /// @ai:intent Message to surface to the user, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            CommandOutcome::NoMarks(message) => Some(message),
            CommandOutcome::NothingConfigured => Some("No mark category is enabled"),
            _ => None,
        }
    }
}

/// @ai:intent Collaborators a command runs against
pub struct CommandContext<'a, H, P, L, R> {
    pub host: &'a mut H,
    pub picker: &'a mut P,
    pub project: Option<&'a ProjectScanner<L, R>>,
    pub config: &'a dyn ConfigSource,
}

/// @ai:intent Run one command to completion
/// @ai:post configuration is read once, fresh, per call
/// @ai:post project files are listed and read only while show_project_marks is set
/// @ai:edge_cases no active document for editor-scoped command -> NoDocument
/// @ai:effects fs:read, host
pub async fn execute<H, P, L, R>(command: &Command, ctx: &mut CommandContext<'_, H, P, L, R>) -> Result<CommandOutcome>
where
    H: EditorHost,
    P: Picker,
    L: FileLister,
    R: FileReader,
{
    let config = ctx.config.load()?;
    let filter = command.filter();

    let Some(scope) = command.scope() else {
        return Ok(step(command, &mut *ctx.host, &ClassifierSet::from_config(&config, filter)));
    };

    let active = ctx.host.active_path();
    if active.is_none() && scope == Scope::Editor {
        return Ok(CommandOutcome::NoDocument);
    }
    let project_enabled = scope.includes_project() && config.show_project_marks;
    if active.is_none() && !project_enabled {
        return Ok(CommandOutcome::NoDocument);
    }

    let classifiers = ClassifierSet::from_config(&config, filter);
    if classifiers.is_empty() {
        return Ok(CommandOutcome::NothingConfigured);
    }

    let mut state = NavigationState::new(ctx.host.cursor());
    state.begin_scan();

    let mut marks = Vec::new();
    if scope.includes_editor() {
        if let Some(doc) = ctx.host.active_document() {
            marks = scan(doc, &classifiers, ScanMode::Full);
        }
    }
    if project_enabled {
        if let Some(project) = ctx.project {
            let skip = if scope.includes_editor() { active.as_deref() } else { None };
            marks.extend(project.scan(&config.project, &classifiers, skip).await);
        }
    }

    if let Some(message) = state.complete_scan(marks, filter) {
        tracing::info!("{}: {}", command, message);
        return Ok(CommandOutcome::NoMarks(message));
    }

    Ok(match state.present(&mut *ctx.host, &mut *ctx.picker, &config).await {
        PresentOutcome::Selected(mark) => CommandOutcome::Selected(mark),
        PresentOutcome::Cancelled => CommandOutcome::Cancelled,
    })
}

/// @ai:intent next/previous: bounded scan from the cursor with one wraparound
fn step<H: EditorHost>(command: &Command, host: &mut H, classifiers: &ClassifierSet) -> CommandOutcome {
    let Some(doc) = host.active_document() else {
        return CommandOutcome::NoDocument;
    };
    if classifiers.is_empty() {
        return CommandOutcome::NothingConfigured;
    }
    let line = host.cursor().map(|p| p.line).unwrap_or(0);

    let target = match command {
        Command::JumpToPrevious(_) => previous_target(doc, classifiers, line),
        _ => next_target(doc, classifiers, line),
    };

    match target {
        Some(mark) => {
            host.reveal(mark.location());
            host.set_cursor(mark.location().end_position());
            tracing::info!("{} -> {}:{}", command, doc_name(&mark), mark.line() + 1);
            CommandOutcome::Moved(mark)
        }
        None => CommandOutcome::Unchanged,
    }
}

fn doc_name(mark: &Mark) -> String {
    mark.location().document.display().to_string()
}

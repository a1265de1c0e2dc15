//! @ai:module:intent Mark scanner and navigator: classify annotated comment lines and jump between them
//! @ai:module:layer infrastructure
//! @ai:module:public_api mark, pattern, classifier, scanner, project, glob, navigation, presentation, status, commands, config, terminal, error
//! @ai:module:stateless false
//!
//! # markjump
//!
//! Finds `SECTION:`/`MARK:` headings, `TODO:`/`FIXME:` items and `NOTE:` remarks
//! in source files, and moves a cursor between them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use markjump::{scan, CategoryFilter, ClassifierSet, Config, ScanMode, TextDocument};
//! use std::path::Path;
//!
//! # async fn run() -> markjump::Result<()> {
//! let config = Config::default();
//! let classifiers = ClassifierSet::from_config(&config, &CategoryFilter::all());
//! let doc = TextDocument::open(Path::new("src/main.rs")).await?;
//! for mark in scan(&doc, &classifiers, ScanMode::Full) {
//!     println!("{}: {}", mark.line() + 1, mark.description());
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod commands;
pub mod config;
pub mod error;
pub mod glob;
pub mod mark;
pub mod navigation;
pub mod pattern;
pub mod presentation;
pub mod project;
pub mod scanner;
pub mod status;
pub mod terminal;

pub use classifier::{Classifier, ClassifierSet};
pub use commands::{execute, Command, CommandContext, CommandOutcome, Scope};
pub use config::{Config, ConfigSource, FileConfigSource, StaticConfig, Theme};
pub use error::{Error, Result};
pub use mark::{CategoryFilter, Location, Mark, MarkFields, MarkKind, Position};
pub use navigation::{EditorHost, NavigationState, Picker, PickerEvent, ViewSnapshot};
pub use pattern::{Matcher, PatternSet, RegexMatcher};
pub use presentation::{format_marks, format_status, present_mark, OutputFormat, PickItem};
pub use project::{FileLister, FileReader, FsReader, ProjectScanner, WalkDirLister};
pub use scanner::{scan, Document, ScanMode, TextDocument};
pub use status::{StatusSummary, StatusTracker};
pub use terminal::{LinePicker, TerminalHost};

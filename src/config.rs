//! @ai:module:intent Configuration structs and sources for mark scanning
//! @ai:module:layer infrastructure
//! @ai:module:public_api Config, PatternConfig, HighlightConfig, ProjectConfig, ConfigSource, FileConfigSource, StaticConfig
//! @ai:module:depends_on mark, pattern, error

use crate::error::Result;
use crate::mark::MarkKind;
use crate::pattern::{defaults, PatternSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent Main configuration; every field has a default so partial files load
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_categories")]
    pub categories: Vec<MarkKind>,
    #[serde(default)]
    pub show_project_marks: bool,
    #[serde(default = "default_true")]
    pub show_status_item: bool,
    #[serde(default = "default_true")]
    pub always_open_document: bool,
    #[serde(default = "default_heading_symbol")]
    pub heading_symbol: String,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub project: ProjectConfig,
}

/// @ai:intent Base and additional pattern lists per mark kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternConfig {
    #[serde(default = "defaults::section")]
    pub section: Vec<String>,
    #[serde(default = "defaults::todo")]
    pub todo: Vec<String>,
    #[serde(default = "defaults::note")]
    pub note: Vec<String>,
    #[serde(default)]
    pub additional_section: Vec<String>,
    #[serde(default)]
    pub additional_todo: Vec<String>,
    #[serde(default)]
    pub additional_note: Vec<String>,
}

/// @ai:intent Highlight colours for dark and light themes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighlightConfig {
    #[serde(default = "default_dark_highlight")]
    pub dark: String,
    #[serde(default = "default_light_highlight")]
    pub light: String,
}

/// @ai:intent Which files a project-wide scan looks at
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

/// Theme variant used to pick a highlight colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            show_project_marks: false,
            show_status_item: true,
            always_open_document: true,
            heading_symbol: default_heading_symbol(),
            patterns: PatternConfig::default(),
            highlight: HighlightConfig::default(),
            project: ProjectConfig::default(),
        }
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            section: defaults::section(),
            todo: defaults::todo(),
            note: defaults::note(),
            additional_section: Vec::new(),
            additional_todo: Vec::new(),
            additional_note: Vec::new(),
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            dark: default_dark_highlight(),
            light: default_light_highlight(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_categories() -> Vec<MarkKind> {
    MarkKind::PRIORITY.to_vec()
}

fn default_heading_symbol() -> String {
    "#".to_string()
}

fn default_dark_highlight() -> String {
    "rgba(255, 255, 255, 0.1)".to_string()
}

fn default_light_highlight() -> String {
    "rgba(0, 0, 0, 0.1)".to_string()
}

fn default_include() -> Vec<String> {
    vec!["**/*".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ]
}

impl Config {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::error::Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// @ai:intent Parse configuration from TOML text
    /// @ai:effects pure
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// @ai:intent Render configuration as TOML
    /// @ai:effects pure
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// @ai:intent Check whether a kind is enabled
    pub fn is_enabled(&self, kind: MarkKind) -> bool {
        self.categories.contains(&kind)
    }

    /// @ai:intent Build the merged pattern set (base ++ additional) for a kind
    /// @ai:effects pure
    pub fn pattern_set(&self, kind: MarkKind) -> PatternSet {
        let p = &self.patterns;
        match kind {
            MarkKind::Section => PatternSet::new(kind, &p.section, &p.additional_section),
            MarkKind::Todo => PatternSet::new(kind, &p.todo, &p.additional_todo),
            MarkKind::Note => PatternSet::new(kind, &p.note, &p.additional_note),
        }
    }

    /// @ai:intent Pick the highlight colour for a theme
    pub fn highlight_color(&self, theme: Theme) -> &str {
        match theme {
            Theme::Dark => &self.highlight.dark,
            Theme::Light => &self.highlight.light,
        }
    }
}

/// @ai:intent Source of configuration, consulted on every command
pub trait ConfigSource: Send + Sync {
    /// @ai:intent Read the current configuration
    fn load(&self) -> Result<Config>;
}

/// @ai:intent Reads a TOML file each time it is asked; missing file means defaults
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for FileConfigSource {
    /// @ai:effects fs:read
    fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!("No config at {}, using defaults", self.path.display());
            return Ok(Config::default());
        }
        Config::load(&self.path)
    }
}

/// @ai:intent Fixed in-memory configuration
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub Config);

impl ConfigSource for StaticConfig {
    fn load(&self) -> Result<Config> {
        Ok(self.0.clone())
    }
}

//! @ai:module:intent Aggregate marks across every file of a project, tolerating per-file failures
//! @ai:module:layer application
//! @ai:module:public_api FileLister, FileReader, WalkDirLister, FsReader, ProjectScanner, scan_project
//! @ai:module:depends_on scanner, classifier, config, glob, error
//! @ai:module:stateless true

use crate::classifier::ClassifierSet;
use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::glob::GlobSet;
use crate::mark::Mark;
use crate::scanner::{scan, ScanMode, TextDocument};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Lists candidate files for a project scan
#[allow(async_fn_in_trait)]
pub trait FileLister: Send + Sync {
    /// @ai:intent List files matching include globs and no exclude glob
    /// @ai:post None means the listing failed; callers treat it as no files
    async fn list_files(&self, include: &[String], exclude: &[String]) -> Option<Vec<PathBuf>>;
}

/// @ai:intent Reads raw file contents
#[allow(async_fn_in_trait)]
pub trait FileReader: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
}

/// @ai:intent Lists files under a root directory with walkdir
pub struct WalkDirLister {
    root: PathBuf,
}

impl WalkDirLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// @ai:intent Walk the tree synchronously, pruning excluded directories
    /// @ai:post result is sorted by path
    /// @ai:effects fs:read
    fn walk(&self, globs: &GlobSet) -> Vec<PathBuf> {
        let root = &self.root;
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| {
                if !e.file_type().is_dir() || e.path() == root.as_path() {
                    return true;
                }
                let relative = e.path().strip_prefix(root).unwrap_or(e.path());
                !globs.excludes_dir(relative)
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let relative = e.path().strip_prefix(root).unwrap_or(e.path());
                globs.is_selected(relative)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }
}

impl FileLister for WalkDirLister {
    /// @ai:effects fs:read
    async fn list_files(&self, include: &[String], exclude: &[String]) -> Option<Vec<PathBuf>> {
        if !self.root.is_dir() {
            tracing::debug!("Project root {} is not a directory", self.root.display());
            return None;
        }
        let globs = GlobSet::new(include, exclude);
        let lister = WalkDirLister::new(self.root.clone());
        match tokio::task::spawn_blocking(move || lister.walk(&globs)).await {
            Ok(files) => Some(files),
            Err(e) => {
                tracing::warn!("File listing failed: {}", e);
                None
            }
        }
    }
}

/// @ai:intent Reads files with tokio::fs
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    /// @ai:effects fs:read
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// @ai:intent Fully scan each file in order and concatenate the marks
/// @ai:post order is file order, then ascending line within a file
/// @ai:edge_cases unreadable or non-UTF-8 file -> skipped silently
/// @ai:effects fs:read
pub async fn scan_project<R: FileReader>(
    files: &[PathBuf],
    reader: &R,
    classifiers: &ClassifierSet,
) -> Vec<Mark> {
    let mut marks = Vec::new();
    if classifiers.is_empty() {
        return marks;
    }

    for path in files {
        let document = match reader.read_file(path).await {
            Ok(bytes) => match TextDocument::from_bytes(path.clone(), bytes) {
                Ok(document) => document,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            },
            Err(e) => {
                tracing::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        marks.extend(scan(&document, classifiers, ScanMode::Full));
    }

    marks
}

/// @ai:intent Lister and reader bundled for project-wide scans
pub struct ProjectScanner<L, R> {
    lister: L,
    reader: R,
}

impl<L: FileLister, R: FileReader> ProjectScanner<L, R> {
    pub fn new(lister: L, reader: R) -> Self {
        Self { lister, reader }
    }

    /// @ai:intent List with the configured globs, then aggregate, optionally skipping the live document
    /// @ai:edge_cases listing failure -> empty result
    /// @ai:effects fs:read
    pub async fn scan(
        &self,
        project: &ProjectConfig,
        classifiers: &ClassifierSet,
        skip: Option<&Path>,
    ) -> Vec<Mark> {
        let Some(mut files) = self
            .lister
            .list_files(&project.include, &project.exclude)
            .await
        else {
            return Vec::new();
        };
        if let Some(skip) = skip {
            files.retain(|f| !same_file(f, skip));
        }
        let marks = scan_project(&files, &self.reader, classifiers).await;
        tracing::debug!("Project scan: {} files, {} marks", files.len(), marks.len());
        marks
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

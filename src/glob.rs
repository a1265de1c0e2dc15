//! @ai:module:intent Match relative file paths against include/exclude globs
//! @ai:module:layer infrastructure
//! @ai:module:public_api GlobMatcher, GlobSet
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use regex::Regex;
use std::path::Path;

/// A NUL file name never appears on disk; an exclude that matches `dir/<NUL>` covers all of `dir`.
const NUL_ENTRY: &str = "\u{0}";

/// @ai:intent A single compiled glob
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    regex: Regex,
}

impl GlobMatcher {
    /// @ai:intent Compile a glob into an anchored regex
    /// @ai:example ("**/*.rs") matches "src/lib.rs" and "main.rs"
    /// @ai:example ("*.md") matches "docs/readme.md" (no slash -> basename match)
    /// @ai:edge_cases unbalanced `[` or `{` -> Error::InvalidGlob
    pub fn new(glob: &str) -> Result<Self> {
        let translated = translate(glob)?;
        let regex = Regex::new(&translated).map_err(|e| Error::InvalidGlob {
            pattern: glob.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// @ai:intent Check a path relative to the scan root
    /// @ai:effects pure
    pub fn is_match(&self, relative: &Path) -> bool {
        self.regex.is_match(&normalize(relative))
    }
}

/// @ai:intent Include/exclude pair; a path must hit an include and miss every exclude
#[derive(Debug, Clone, Default)]
pub struct GlobSet {
    include: Vec<GlobMatcher>,
    exclude: Vec<GlobMatcher>,
}

impl GlobSet {
    /// @ai:intent Compile both lists, dropping globs that fail to compile
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        Self {
            include: compile_all(include),
            exclude: compile_all(exclude),
        }
    }

    /// @ai:intent Decide whether a relative path is selected
    /// @ai:post an empty include list selects everything not excluded
    pub fn is_selected(&self, relative: &Path) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|g| g.is_match(relative));
        included && !self.exclude.iter().any(|g| g.is_match(relative))
    }

    /// @ai:intent Check whether a directory can be pruned without visiting it
    /// @ai:post true only when an exclude glob covers everything below the directory
    /// @ai:example ("**/target/**", "target") -> true
    /// @ai:example ("**/*.md", "notes.md") -> false
    pub fn excludes_dir(&self, relative: &Path) -> bool {
        let inside = relative.join(NUL_ENTRY);
        self.exclude.iter().any(|g| g.is_match(&inside))
    }
}

fn compile_all(globs: &[String]) -> Vec<GlobMatcher> {
    globs
        .iter()
        .filter_map(|g| match GlobMatcher::new(g) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!("Ignoring glob: {}", e);
                None
            }
        })
        .collect()
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn translate(glob: &str) -> Result<String> {
    let invalid = |message: &str| Error::InvalidGlob {
        pattern: glob.to_string(),
        message: message.to_string(),
    };

    let mut out = String::from("^");
    if !glob.contains('/') {
        out.push_str("(?:.*/)?");
    }

    let chars: Vec<char> = glob.chars().collect();
    let mut i = 0;
    let mut brace_depth = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let at_segment_start = i == 0 || chars[i - 1] == '/';
                if at_segment_start && chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i += 3;
                    continue;
                }
                if i > 0 && chars[i - 1] == '/' && i + 2 == chars.len() {
                    // "dir/**" also matches "dir" itself
                    out.pop();
                    out.push_str("(?:/.*)?");
                } else {
                    out.push_str(".*");
                }
                i += 2;
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == ']')
                    .ok_or_else(|| invalid("unclosed `[`"))?;
                let body = &chars[i + 1..i + 1 + close];
                out.push('[');
                match body.split_first() {
                    Some((&'!', rest)) => {
                        out.push('^');
                        push_class(&mut out, rest);
                    }
                    _ => push_class(&mut out, body),
                }
                out.push(']');
                i += close + 2;
                continue;
            }
            '{' => {
                brace_depth += 1;
                out.push_str("(?:");
            }
            ',' if brace_depth > 0 => out.push('|'),
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                out.push(')');
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
        i += 1;
    }

    if brace_depth > 0 {
        return Err(invalid("unclosed `{`"));
    }

    out.push('$');
    Ok(out)
}

/// Copy a bracket expression body, keeping `a-z` ranges and escaping anything
/// the regex class syntax would read as nesting or a set operation.
fn push_class(out: &mut String, body: &[char]) {
    for (i, &ch) in body.iter().enumerate() {
        let range_dash = ch == '-' && i > 0 && i + 1 < body.len() && body[i - 1] != '-';
        if !range_dash && matches!(ch, '\\' | '[' | ']' | '&' | '~' | '-' | '^') {
            out.push('\\');
        }
        out.push(ch);
    }
}

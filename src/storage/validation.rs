//! Path validation
//!
//! Handles name validation, relative path parsing and the root-relative
//! `ItemPath` shared by every backend.

use std::fmt;

use crate::error::{StorageError, StorageResult};

/// Default upper bound on a single item name, in bytes.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 255;

/// Hidden names ending with this suffix hold in-progress writes and are never items.
pub const PARTIAL_WRITE_SUFFIX: &str = ".partial-write";

/// Path of an item relative to its backend root.
///
/// The root itself has no segments. Segments are always valid names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemPath {
    segments: Vec<String>,
}

impl ItemPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<ItemPath> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn child(&self, name: &str) -> ItemPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> ItemPath {
        let mut joined = self.segments.clone();
        joined.extend(segments.iter().map(|s| s.as_ref().to_string()));
        Self { segments: joined }
    }

    /// True when `self` is `prefix` or lies beneath it.
    pub fn starts_with(&self, prefix: &ItemPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    pub fn is_child_of(&self, parent: &ItemPath) -> bool {
        self.segments.len() == parent.segments.len() + 1 && self.starts_with(parent)
    }

    /// Moves `self` from under `from` to under `to`.
    pub fn rebase(&self, from: &ItemPath, to: &ItemPath) -> Option<ItemPath> {
        if !self.starts_with(from) {
            return None;
        }
        Some(to.join(&self.segments[from.segments.len()..]))
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

fn has_forbidden_chars(name: &str) -> bool {
    name.chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
}

/// True for names reserved for staging writes, like `.a.txt.partial-write`.
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with('.') && name.len() > 1 && name.ends_with(PARTIAL_WRITE_SUFFIX)
}

/// Validate a name for a new item
pub fn validate_name(name: &str, max_length: usize) -> StorageResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.len() > max_length
        || has_forbidden_chars(name)
        || is_reserved_name(name)
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Split a lookup path relative to a folder into its segments.
///
/// Both `/` and `\` separate segments. Empty and `.` segments are skipped;
/// `..` and reserved names never resolve.
pub fn parse_relative(path: &str) -> StorageResult<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(StorageError::InvalidPath(path.to_string())),
            s if has_forbidden_chars(s) || is_reserved_name(s) => {
                return Err(StorageError::InvalidPath(path.to_string()));
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Split a relative path into its parent part and final name.
pub fn split_parent(path: &str) -> StorageResult<(Option<String>, String)> {
    let mut segments = parse_relative(path)?;
    let name = segments.pop().map(str::to_string).unwrap_or_default();
    if segments.is_empty() {
        Ok((None, name))
    } else {
        Ok((Some(segments.join("/")), name))
    }
}

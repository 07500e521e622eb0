//! Name collision handling for create and rename operations

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{StorageError, StorageResult};
use crate::storage::item::ItemKind;
use crate::storage::validation::validate_name;

/// What to do when the desired name already names a sibling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationCollisionOption {
    #[default]
    FailIfExists,
    /// Remove the existing sibling, whatever its kind, and create afresh
    ReplaceExisting,
    /// Append ` (N)` before the extension until the name is free
    GenerateUniqueName,
    /// Hand back the existing sibling when it has the requested kind
    OpenIfExists,
}

impl FromStr for CreationCollisionOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" | "fail_if_exists" => Ok(Self::FailIfExists),
            "replace" | "replace_existing" => Ok(Self::ReplaceExisting),
            "unique" | "generate_unique_name" => Ok(Self::GenerateUniqueName),
            "open" | "open_if_exists" => Ok(Self::OpenIfExists),
            other => Err(format!("unknown collision option: {}", other)),
        }
    }
}

impl fmt::Display for CreationCollisionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FailIfExists => "fail",
            Self::ReplaceExisting => "replace",
            Self::GenerateUniqueName => "unique",
            Self::OpenIfExists => "open",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of applying a collision option to a desired name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionResolution {
    /// Create a new item under this name
    Create(String),
    /// Remove the sibling under this name, then create
    Replace(String),
    /// Reuse the existing sibling
    Open,
}

/// Decide how a create (or rename) proceeds.
///
/// `existing` is the kind of the sibling currently holding `desired`, if any.
/// `is_taken` answers whether a candidate name is already used by any sibling.
/// Generated names never exceed `max_name_length` bytes.
pub fn resolve_collision(
    option: CreationCollisionOption,
    desired: &str,
    requested: ItemKind,
    existing: Option<ItemKind>,
    max_name_length: usize,
    is_taken: impl Fn(&str) -> bool,
) -> StorageResult<CollisionResolution> {
    let Some(existing) = existing else {
        return Ok(CollisionResolution::Create(desired.to_string()));
    };

    match option {
        CreationCollisionOption::FailIfExists => {
            Err(StorageError::NameCollision(desired.to_string()))
        }
        CreationCollisionOption::ReplaceExisting => {
            Ok(CollisionResolution::Replace(desired.to_string()))
        }
        CreationCollisionOption::GenerateUniqueName => {
            let candidate = unique_name(desired, requested, max_name_length, is_taken)?;
            validate_name(&candidate, max_name_length)?;
            Ok(CollisionResolution::Create(candidate))
        }
        CreationCollisionOption::OpenIfExists if existing == requested => {
            Ok(CollisionResolution::Open)
        }
        CreationCollisionOption::OpenIfExists => Err(StorageError::TypeMismatch {
            path: desired.to_string(),
            expected: requested,
        }),
    }
}

/// Smallest `stem (N).ext` (N >= 2) not yet taken.
///
/// Folders and dot-files keep their whole name as the stem. The stem is cut
/// short when the candidate would exceed `max_length` bytes.
pub fn unique_name(
    desired: &str,
    kind: ItemKind,
    max_length: usize,
    is_taken: impl Fn(&str) -> bool,
) -> StorageResult<String> {
    let (stem, extension) = match (kind, desired.rfind('.')) {
        (ItemKind::File, Some(dot)) if dot > 0 => desired.split_at(dot),
        _ => (desired, ""),
    };

    let mut counter: u64 = 2;
    loop {
        let suffix = format!(" ({}){}", counter, extension);
        let stem = match max_length.checked_sub(suffix.len()) {
            Some(room) => truncate_at_boundary(stem, room),
            None => "",
        };
        if stem.is_empty() {
            return Err(StorageError::InvalidName(desired.to_string()));
        }

        let candidate = format!("{}{}", stem, suffix);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
        counter += 1;
    }
}

fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::validation::DEFAULT_MAX_NAME_LENGTH;
    use std::collections::HashSet;

    const MAX: usize = DEFAULT_MAX_NAME_LENGTH;

    fn taken(names: &[&str]) -> impl Fn(&str) -> bool {
        let set: HashSet<String> = names.iter().map(|s| s.to_string()).collect();
        move |candidate: &str| set.contains(candidate)
    }

    #[test]
    fn test_no_collision_creates_desired() {
        for option in [
            CreationCollisionOption::FailIfExists,
            CreationCollisionOption::ReplaceExisting,
            CreationCollisionOption::GenerateUniqueName,
            CreationCollisionOption::OpenIfExists,
        ] {
            assert_eq!(
                resolve_collision(option, "a.txt", ItemKind::File, None, MAX, taken(&[]))
                    .unwrap(),
                CollisionResolution::Create("a.txt".into())
            );
        }
    }

    #[test]
    fn test_fail_if_exists_covers_both_kinds() {
        let result = resolve_collision(
            CreationCollisionOption::FailIfExists,
            "x",
            ItemKind::File,
            Some(ItemKind::Folder),
            MAX,
            taken(&["x"]),
        );
        assert!(matches!(result, Err(StorageError::NameCollision(n)) if n == "x"));
    }

    #[test]
    fn test_open_if_exists() {
        assert_eq!(
            resolve_collision(
                CreationCollisionOption::OpenIfExists,
                "docs",
                ItemKind::Folder,
                Some(ItemKind::Folder),
                MAX,
                taken(&["docs"]),
            )
            .unwrap(),
            CollisionResolution::Open
        );

        let mismatch = resolve_collision(
            CreationCollisionOption::OpenIfExists,
            "docs",
            ItemKind::File,
            Some(ItemKind::Folder),
            MAX,
            taken(&["docs"]),
        );
        assert!(matches!(
            mismatch,
            Err(StorageError::TypeMismatch { expected: ItemKind::File, .. })
        ));
    }

    #[test]
    fn test_replace_existing() {
        assert_eq!(
            resolve_collision(
                CreationCollisionOption::ReplaceExisting,
                "a.txt",
                ItemKind::File,
                Some(ItemKind::File),
                MAX,
                taken(&["a.txt"]),
            )
            .unwrap(),
            CollisionResolution::Replace("a.txt".into())
        );
    }

    #[test]
    fn test_unique_name_sequence() {
        assert_eq!(
            unique_name("a.txt", ItemKind::File, MAX, taken(&["a.txt"])).unwrap(),
            "a (2).txt"
        );
        assert_eq!(
            unique_name("a.txt", ItemKind::File, MAX, taken(&["a.txt", "a (2).txt"])).unwrap(),
            "a (3).txt"
        );
        assert_eq!(
            unique_name("archive.tar.gz", ItemKind::File, MAX, taken(&[])).unwrap(),
            "archive.tar (2).gz"
        );
    }

    #[test]
    fn test_unique_name_keeps_folder_and_dotfile_names_whole() {
        assert_eq!(
            unique_name("v1.0", ItemKind::Folder, MAX, taken(&[])).unwrap(),
            "v1.0 (2)"
        );
        assert_eq!(
            unique_name(".env", ItemKind::File, MAX, taken(&[])).unwrap(),
            ".env (2)"
        );
    }

    #[test]
    fn test_unique_name_fits_length_limit() {
        assert_eq!(
            unique_name("abcd.txt", ItemKind::File, 10, taken(&[])).unwrap(),
            "ab (2).txt"
        );
        assert_eq!(
            unique_name("abcd.txt", ItemKind::File, 10, taken(&["ab (2).txt"])).unwrap(),
            "ab (3).txt"
        );
        // multi-byte characters are never split
        assert_eq!(
            unique_name("ééé", ItemKind::Folder, 9, taken(&[])).unwrap(),
            "éé (2)"
        );

        let long = format!("{}.txt", "x".repeat(251));
        let candidate = unique_name(&long, ItemKind::File, MAX, taken(&[])).unwrap();
        assert_eq!(candidate.len(), MAX);
        assert!(candidate.ends_with(" (2).txt"));
    }

    #[test]
    fn test_unique_name_without_room_is_invalid() {
        assert!(matches!(
            unique_name("abcd.txt", ItemKind::File, 8, taken(&[])),
            Err(StorageError::InvalidName(n)) if n == "abcd.txt"
        ));
        assert!(matches!(
            resolve_collision(
                CreationCollisionOption::GenerateUniqueName,
                "abcd.txt",
                ItemKind::File,
                Some(ItemKind::File),
                8,
                taken(&["abcd.txt"]),
            ),
            Err(StorageError::InvalidName(_))
        ));
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(
            "replace".parse::<CreationCollisionOption>().unwrap(),
            CreationCollisionOption::ReplaceExisting
        );
        assert_eq!(
            "UNIQUE".parse::<CreationCollisionOption>().unwrap(),
            CreationCollisionOption::GenerateUniqueName
        );
        assert!("sometimes".parse::<CreationCollisionOption>().is_err());
    }
}

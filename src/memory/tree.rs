//! Shared in-memory tree
//!
//! Every node lives in one ordered map keyed by its root-relative path, so the
//! descendants of a folder are a contiguous range right after it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::storage::{
    CollisionResolution, CreationCollisionOption, ItemKind, ItemPath, ItemProperties,
    resolve_collision, validate_name,
};

pub(crate) type SharedTree = Arc<RwLock<MemoryTree>>;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    File {
        content: Vec<u8>,
        modified: SystemTime,
    },
    Folder {
        modified: SystemTime,
    },
}

impl Node {
    fn empty(kind: ItemKind) -> Self {
        let modified = SystemTime::now();
        match kind {
            ItemKind::File => Node::File {
                content: Vec::new(),
                modified,
            },
            ItemKind::Folder => Node::Folder { modified },
        }
    }

    pub(crate) fn kind(&self) -> ItemKind {
        match self {
            Node::File { .. } => ItemKind::File,
            Node::Folder { .. } => ItemKind::Folder,
        }
    }

    pub(crate) fn properties(&self) -> ItemProperties {
        match self {
            Node::File { content, modified } => {
                ItemProperties::file(content.len() as u64, Some(*modified))
            }
            Node::Folder { modified } => ItemProperties::folder(Some(*modified)),
        }
    }
}

#[derive(Debug)]
pub(crate) struct MemoryTree {
    nodes: BTreeMap<ItemPath, Node>,
}

impl MemoryTree {
    pub(crate) fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ItemPath::root(), Node::empty(ItemKind::Folder));
        Self { nodes }
    }

    pub(crate) fn shared() -> SharedTree {
        Arc::new(RwLock::new(Self::new()))
    }

    fn kind_of(&self, path: &ItemPath) -> Option<ItemKind> {
        self.nodes.get(path).map(Node::kind)
    }

    /// The node at `path`, which must be of `kind`.
    pub(crate) fn node(&self, path: &ItemPath, kind: ItemKind) -> StorageResult<&Node> {
        match self.nodes.get(path) {
            None => Err(StorageError::NotFound(path.to_string())),
            Some(node) if node.kind() != kind => Err(StorageError::TypeMismatch {
                path: path.to_string(),
                expected: kind,
            }),
            Some(node) => Ok(node),
        }
    }

    fn node_mut(&mut self, path: &ItemPath, kind: ItemKind) -> StorageResult<&mut Node> {
        match self.nodes.get_mut(path) {
            None => Err(StorageError::NotFound(path.to_string())),
            Some(node) if node.kind() != kind => Err(StorageError::TypeMismatch {
                path: path.to_string(),
                expected: kind,
            }),
            Some(node) => Ok(node),
        }
    }

    /// Direct children of `parent`, in name order.
    pub(crate) fn children(&self, parent: &ItemPath) -> Vec<(ItemPath, ItemKind)> {
        self.nodes
            .range(parent.clone()..)
            .take_while(|(path, _)| path.starts_with(parent))
            .filter(|(path, _)| path.is_child_of(parent))
            .map(|(path, node)| (path.clone(), node.kind()))
            .collect()
    }

    /// Walks `segments` down from `base`.
    pub(crate) fn resolve(
        &self,
        base: &ItemPath,
        segments: &[&str],
    ) -> StorageResult<(ItemPath, ItemKind)> {
        self.node(base, ItemKind::Folder)?;

        let mut current = base.clone();
        let mut kind = ItemKind::Folder;
        for segment in segments {
            // a file cannot have children
            if kind == ItemKind::File {
                return Err(StorageError::NotFound(current.child(segment).to_string()));
            }
            current = current.child(segment);
            kind = self
                .kind_of(&current)
                .ok_or_else(|| StorageError::NotFound(current.to_string()))?;
        }
        Ok((current, kind))
    }

    fn touch(&mut self, path: &ItemPath) {
        if let Some(Node::Folder { modified } | Node::File { modified, .. }) =
            self.nodes.get_mut(path)
        {
            *modified = SystemTime::now();
        }
    }

    fn remove_subtree(&mut self, path: &ItemPath) {
        self.nodes.retain(|p, _| !p.starts_with(path));
    }

    fn move_subtree(&mut self, from: &ItemPath, to: &ItemPath) {
        let moved: Vec<ItemPath> = self
            .nodes
            .range(from.clone()..)
            .take_while(|(path, _)| path.starts_with(from))
            .map(|(path, _)| path.clone())
            .collect();

        for old in moved {
            if let (Some(node), Some(new)) = (self.nodes.remove(&old), old.rebase(from, to)) {
                self.nodes.insert(new, node);
            }
        }
    }

    /// Creates a child of `parent` following the collision option.
    pub(crate) fn create(
        &mut self,
        parent: &ItemPath,
        desired: &str,
        kind: ItemKind,
        option: CreationCollisionOption,
        max_name_length: usize,
    ) -> StorageResult<ItemPath> {
        validate_name(desired, max_name_length)?;
        self.node(parent, ItemKind::Folder)?;

        let existing = self.kind_of(&parent.child(desired));
        let resolution =
            resolve_collision(option, desired, kind, existing, max_name_length, |candidate| {
                self.nodes.contains_key(&parent.child(candidate))
            })?;

        let path = match resolution {
            CollisionResolution::Create(name) => parent.child(&name),
            CollisionResolution::Replace(name) => {
                let path = parent.child(&name);
                self.remove_subtree(&path);
                path
            }
            CollisionResolution::Open => return Ok(parent.child(desired)),
        };

        self.nodes.insert(path.clone(), Node::empty(kind));
        self.touch(parent);
        Ok(path)
    }

    /// Renames `path` inside its parent; returns the new path.
    pub(crate) fn rename(
        &mut self,
        path: &ItemPath,
        kind: ItemKind,
        desired: &str,
        option: CreationCollisionOption,
        max_name_length: usize,
    ) -> StorageResult<ItemPath> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;
        validate_name(desired, max_name_length)?;
        self.node(path, kind)?;

        if path.name() == Some(desired) {
            return Ok(path.clone());
        }

        let option = match option {
            CreationCollisionOption::OpenIfExists => CreationCollisionOption::FailIfExists,
            other => other,
        };
        let existing = self.kind_of(&parent.child(desired));
        let resolution =
            resolve_collision(option, desired, kind, existing, max_name_length, |candidate| {
                self.nodes.contains_key(&parent.child(candidate))
            })?;

        let target = match resolution {
            CollisionResolution::Create(name) => parent.child(&name),
            CollisionResolution::Replace(name) => {
                let target = parent.child(&name);
                self.remove_subtree(&target);
                target
            }
            CollisionResolution::Open => {
                return Err(StorageError::NameCollision(desired.to_string()));
            }
        };

        self.move_subtree(path, &target);
        self.touch(&parent);
        Ok(target)
    }

    pub(crate) fn delete(&mut self, path: &ItemPath, kind: ItemKind) -> StorageResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;
        self.node(path, kind)?;
        self.remove_subtree(path);
        self.touch(&parent);
        Ok(())
    }

    pub(crate) fn read(&self, path: &ItemPath) -> StorageResult<Vec<u8>> {
        match self.node(path, ItemKind::File)? {
            Node::File { content, .. } => Ok(content.clone()),
            Node::Folder { .. } => Err(StorageError::TypeMismatch {
                path: path.to_string(),
                expected: ItemKind::File,
            }),
        }
    }

    pub(crate) fn write(&mut self, path: &ItemPath, data: &[u8]) -> StorageResult<()> {
        if let Node::File { content, modified } = self.node_mut(path, ItemKind::File)? {
            *content = data.to_vec();
            *modified = SystemTime::now();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 255;

    #[test]
    fn test_children_are_direct_and_sorted() {
        let mut tree = MemoryTree::new();
        let root = ItemPath::root();
        let opt = CreationCollisionOption::FailIfExists;

        let docs = tree.create(&root, "docs", ItemKind::Folder, opt, MAX).unwrap();
        tree.create(&docs, "nested.txt", ItemKind::File, opt, MAX).unwrap();
        tree.create(&root, "b.txt", ItemKind::File, opt, MAX).unwrap();
        tree.create(&root, "a.txt", ItemKind::File, opt, MAX).unwrap();

        let names: Vec<String> = tree
            .children(&root)
            .into_iter()
            .map(|(p, _)| p.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "docs"]);
    }

    #[test]
    fn test_resolve_through_file_is_not_found() {
        let mut tree = MemoryTree::new();
        let root = ItemPath::root();
        tree.create(&root, "a.txt", ItemKind::File, Default::default(), MAX)
            .unwrap();

        let result = tree.resolve(&root, &["a.txt", "inner"]);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_rename_moves_descendants() {
        let mut tree = MemoryTree::new();
        let root = ItemPath::root();
        let opt = CreationCollisionOption::FailIfExists;
        let old = tree.create(&root, "old", ItemKind::Folder, opt, MAX).unwrap();
        let file = tree.create(&old, "a.txt", ItemKind::File, opt, MAX).unwrap();
        tree.write(&file, b"hello").unwrap();

        let new = tree.rename(&old, ItemKind::Folder, "new", opt, MAX).unwrap();

        assert!(tree.node(&old, ItemKind::Folder).is_err());
        assert_eq!(tree.read(&new.child("a.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_replace_drops_whole_subtree() {
        let mut tree = MemoryTree::new();
        let root = ItemPath::root();
        let opt = CreationCollisionOption::FailIfExists;
        let x = tree.create(&root, "x", ItemKind::Folder, opt, MAX).unwrap();
        tree.create(&x, "inner.txt", ItemKind::File, opt, MAX).unwrap();

        let replaced = tree
            .create(
                &root,
                "x",
                ItemKind::File,
                CreationCollisionOption::ReplaceExisting,
                MAX,
            )
            .unwrap();

        assert_eq!(tree.node(&replaced, ItemKind::File).unwrap().kind(), ItemKind::File);
        assert!(tree.node(&x.child("inner.txt"), ItemKind::File).is_err());
    }

    #[test]
    fn test_delete_root_is_invalid() {
        let mut tree = MemoryTree::new();
        assert!(matches!(
            tree.delete(&ItemPath::root(), ItemKind::Folder),
            Err(StorageError::InvalidPath(_))
        ));
    }
}

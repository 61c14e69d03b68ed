//! Lazily loaded directory tree
//!
//! Nodes live in an arena and refer to each other through [`NodeId`]. A node
//! whose children have not been read yet carries a single placeholder child
//! (empty path) so the UI can draw an expander; the placeholder is dropped the
//! first time the node is expanded and its real subdirectories are read.
//!
//! A path index sits beside the arena so that looking a node up by path does
//! not need a walk, but revealing a path still goes hop by hop down its
//! ancestor chain, loading each level as needed.

use crate::domain::{classify, path_key, paths_equal, DriveInfo};
use crate::error::{ExplorerError, Result};
use crate::filesystem::{is_reserved_dir_name, FileSystem};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directories beyond this many children are silently truncated.
pub const MAX_CHILDREN: usize = 100;

pub const PLACEHOLDER_NAME: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct TreeNode {
    name: String,
    full_path: PathBuf,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    is_expanded: bool,
    is_loaded: bool,
    is_selected: bool,
}

impl TreeNode {
    fn new(name: String, full_path: PathBuf, parent: Option<NodeId>) -> Self {
        TreeNode {
            name,
            full_path,
            parent,
            children: Vec::new(),
            is_expanded: false,
            is_loaded: false,
            is_selected: false,
        }
    }

    fn placeholder(parent: NodeId) -> Self {
        Self::new(PLACEHOLDER_NAME.to_string(), PathBuf::new(), Some(parent))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_placeholder(&self) -> bool {
        self.full_path.as_os_str().is_empty()
    }

    pub fn expander_icon(&self) -> &'static str {
        classify::expander_icon(self.is_expanded)
    }
}

#[derive(Debug, Default)]
pub struct DirectoryTree {
    nodes: Vec<Option<TreeNode>>,
    free: Vec<usize>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole forest with one unloaded root per drive.
    pub fn seed_roots(&mut self, drives: &[DriveInfo]) {
        self.nodes.clear();
        self.free.clear();
        self.roots.clear();
        self.index.clear();

        for drive in drives {
            let id = self.alloc(TreeNode::new(
                drive.display_name.clone(),
                drive.name.clone(),
                None,
            ));
            self.attach_placeholder(id);
            self.roots.push(id);
        }
        debug!("Seeded directory tree with {} roots", self.roots.len());
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn node(&self, id: NodeId) -> Result<&TreeNode> {
        self.get(id).ok_or(ExplorerError::UnknownNode(id))
    }

    /// Number of live nodes, placeholders included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// O(1) lookup of an already materialized node.
    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.index.get(&path_key(path)).copied()
    }

    /// Toggles the expanded flag, loading children on the first expansion.
    /// Returns the new expanded state. Placeholders are ignored.
    pub fn expand<F: FileSystem>(&mut self, id: NodeId, fs: &F) -> Result<bool> {
        let node = self.node_mut(id)?;
        if node.is_placeholder() {
            return Ok(false);
        }
        node.is_expanded = !node.is_expanded;
        let (expanded, loaded) = (node.is_expanded, node.is_loaded);

        if expanded && !loaded {
            self.load_children(id, fs)?;
        }
        Ok(expanded)
    }

    pub fn collapse(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.is_expanded = false;
        Ok(())
    }

    /// Replaces the node's children with its current subdirectories.
    ///
    /// Each new child gets a placeholder if it has at least one subdirectory of
    /// its own. That probe is one level deep and is not refreshed later.
    pub fn load_children<F: FileSystem>(&mut self, id: NodeId, fs: &F) -> Result<()> {
        let path = self.node(id)?.full_path.clone();

        let old_children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in old_children {
            self.release(child);
        }
        self.node_mut(id)?.is_loaded = false;

        let subdirs = fs.list_subdirectories(&path)?;
        let total = subdirs.len();
        let mut children = Vec::new();

        for dir in subdirs
            .into_iter()
            .filter(|p| !p.file_name().is_some_and(|n| is_reserved_dir_name(&n.to_string_lossy())))
            .take(MAX_CHILDREN)
        {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string());
            let needs_placeholder = fs.has_subdirectories(&dir);

            let child = self.alloc(TreeNode::new(name, dir, Some(id)));
            if needs_placeholder {
                self.attach_placeholder(child);
            }
            children.push(child);
        }

        debug!(
            "Loaded {} of {} subdirectories of {:?}",
            children.len(),
            total,
            path
        );
        let node = self.node_mut(id)?;
        node.children = children;
        node.is_loaded = true;
        Ok(())
    }

    /// Re-reads the children of an already loaded node.
    pub fn refresh<F: FileSystem>(&mut self, id: NodeId, fs: &F) -> Result<()> {
        if self.node(id)?.is_loaded {
            self.load_children(id, fs)?;
        }
        Ok(())
    }

    /// Clears `previous` (if still alive) and marks `id` selected. Does not
    /// search the tree for other selected nodes.
    pub fn set_selected(&mut self, id: NodeId, previous: Option<NodeId>) -> Result<()> {
        if let Some(prev) = previous {
            self.clear_selected(prev);
        }
        self.node_mut(id)?.is_selected = true;
        Ok(())
    }

    pub fn clear_selected(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut()) {
            node.is_selected = false;
        }
    }

    /// Expands the tree down to `target` and returns its node.
    ///
    /// The ancestor chain is walked from the deepest seeded root that contains
    /// the target. Every node on the chain, the target included, ends up
    /// expanded and loaded. On a failed hop the tree stays partially expanded
    /// and the error names the 1-based level and segment that did not match.
    pub fn select_path<F: FileSystem>(&mut self, target: &Path, fs: &F) -> Result<NodeId> {
        let chain = ancestor_chain(target);
        let Some(first) = chain.first() else {
            return Err(ExplorerError::RevealFailed {
                depth: 1,
                segment: target.display().to_string(),
            });
        };

        let start = chain
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, p)| self.find_root(p).map(|root| (i, root)));
        let Some((start, mut current)) = start else {
            debug!("No root contains {:?}", target);
            return Err(ExplorerError::RevealFailed {
                depth: 1,
                segment: segment_name(first),
            });
        };

        self.ensure_expanded(current, fs);
        for (i, hop) in chain.iter().enumerate().skip(start + 1) {
            let next = self.node(current)?.children.iter().copied().find(|&child| {
                self.get(child)
                    .is_some_and(|n| !n.is_placeholder() && paths_equal(&n.full_path, hop))
            });
            let Some(next) = next else {
                debug!("Reveal of {:?} failed at level {}: {:?}", target, i + 1, hop);
                return Err(ExplorerError::RevealFailed {
                    depth: i + 1,
                    segment: segment_name(hop),
                });
            };
            current = next;
            self.ensure_expanded(current, fs);
        }
        Ok(current)
    }

    /// Depth-first listing of every node a UI would draw: roots plus the
    /// children of expanded nodes, with their depth.
    pub fn visible_rows(&self) -> Vec<(NodeId, usize)> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            rows.push((id, depth));
            if node.is_expanded {
                stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        rows
    }

    fn find_root(&self, path: &Path) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.get(id).is_some_and(|n| paths_equal(&n.full_path, path)))
    }

    fn ensure_expanded<F: FileSystem>(&mut self, id: NodeId, fs: &F) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut()) else {
            return;
        };
        node.is_expanded = true;
        if !node.is_loaded {
            if let Err(e) = self.load_children(id, fs) {
                warn!("Failed to load subdirectories: {}", e);
            }
        }
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        let key = (!node.is_placeholder()).then(|| path_key(&node.full_path));
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        };
        if let Some(key) = key {
            self.index.insert(key, id);
        }
        id
    }

    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id.0).and_then(|slot| slot.take()) else {
                continue;
            };
            if !node.is_placeholder() {
                let key = path_key(&node.full_path);
                if self.index.get(&key) == Some(&id) {
                    self.index.remove(&key);
                }
            }
            stack.extend(node.children);
            self.free.push(id.0);
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        self.nodes
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(ExplorerError::UnknownNode(id))
    }

    fn attach_placeholder(&mut self, parent: NodeId) {
        let placeholder = self.alloc(TreeNode::placeholder(parent));
        if let Some(node) = self.nodes.get_mut(parent.0).and_then(|slot| slot.as_mut()) {
            node.children.push(placeholder);
        }
    }
}

/// Root-to-leaf list of the directories leading to `path`, `path` included.
pub fn ancestor_chain(path: &Path) -> Vec<PathBuf> {
    let mut chain: Vec<PathBuf> = path
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .collect();
    chain.reverse();
    chain
}

fn segment_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

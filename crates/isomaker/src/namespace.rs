//! Per-namespace name trees.
//!
//! Every namespace (primary ISO-9660, Joliet, UDF, HFS+) keeps its own tree of [`NameNode`]s.
//! Nodes live in an arena owned by the [`Namespace`]; directories own the list of their
//! children while the parent link is a plain `NodeId` that is never used to release anything.

use std::fmt;
use std::ops::BitOr;

use crate::error::{IsoMakerError, Result};
use crate::ids::{NodeId, ObjectIndex};
use crate::object::ObjectKind;

/// Child arrays grow in blocks of this many entries.
pub const CHILD_BLOCK: usize = 32;
/// Upper bound (exclusive) on the number of children of one directory.
pub const MAX_CHILDREN_PER_DIR: usize = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamespaceKind {
    Iso9660,
    Joliet,
    Udf,
    Hfs,
}

impl NamespaceKind {
    pub const COUNT: usize = 4;
    pub const ALL: [NamespaceKind; NamespaceKind::COUNT] = [
        NamespaceKind::Iso9660,
        NamespaceKind::Joliet,
        NamespaceKind::Udf,
        NamespaceKind::Hfs,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NamespaceKind::Iso9660 => "iso9660",
            NamespaceKind::Joliet => "joliet",
            NamespaceKind::Udf => "udf",
            NamespaceKind::Hfs => "hfs",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of namespaces, used to select where an object gets bound.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NamespaceSet(u32);

impl NamespaceSet {
    pub const EMPTY: NamespaceSet = NamespaceSet(0);
    pub const ISO9660: NamespaceSet = NamespaceSet(NamespaceKind::Iso9660.bit());
    pub const JOLIET: NamespaceSet = NamespaceSet(NamespaceKind::Joliet.bit());
    pub const UDF: NamespaceSet = NamespaceSet(NamespaceKind::Udf.bit());
    pub const HFS: NamespaceSet = NamespaceSet(NamespaceKind::Hfs.bit());
    pub const ALL: NamespaceSet = NamespaceSet(0b1111);

    /// Builds a set from raw bits, rejecting unknown bits.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !Self::ALL.0 != 0 {
            return Err(IsoMakerError::InvalidParameter(format!(
                "unknown namespace bits {bits:#x}"
            )));
        }
        Ok(NamespaceSet(bits))
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, kind: NamespaceKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = NamespaceKind> {
        NamespaceKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl From<NamespaceKind> for NamespaceSet {
    fn from(kind: NamespaceKind) -> Self {
        NamespaceSet(kind.bit())
    }
}

impl BitOr for NamespaceSet {
    type Output = NamespaceSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        NamespaceSet(self.0 | rhs.0)
    }
}

impl fmt::Debug for NamespaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// One object's appearance in one namespace tree.
#[derive(Debug, Clone)]
pub struct NameNode {
    object: ObjectIndex,
    parent: Option<NodeId>,
    depth: u32,
    specified: String,
    name: String,
    children: Option<Vec<NodeId>>,
}

impl NameNode {
    #[must_use]
    pub fn object(&self) -> ObjectIndex {
        self.object
    }

    /// Parent directory; `None` only for the namespace root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The name as given by the caller.
    #[must_use]
    pub fn specified_name(&self) -> &str {
        &self.specified
    }

    /// The namespace-legal name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.children.is_some()
    }

    /// Children of a directory node, empty for files.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespaceStats {
    /// Name nodes in the tree, including the root.
    pub names: u32,
    /// Directory name nodes, including the root.
    pub directories: u32,
}

#[derive(Debug)]
pub struct Namespace {
    kind: NamespaceKind,
    level: u8,
    rock_ridge_level: u8,
    root: Option<NodeId>,
    nodes: Vec<NameNode>,
    stats: NamespaceStats,
}

impl Namespace {
    pub(crate) fn new(kind: NamespaceKind, level: u8, rock_ridge_level: u8) -> Self {
        Self {
            kind,
            level,
            rock_ridge_level,
            root: None,
            nodes: Vec::new(),
            stats: NamespaceStats::default(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> NamespaceKind {
        self.kind
    }

    /// A namespace with level 0 is disabled and skipped when binding.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.level > 0
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub fn rock_ridge_level(&self) -> u8 {
        self.rock_ridge_level
    }

    pub(crate) fn set_level(&mut self, level: u8) {
        debug_assert!(self.root.is_none());
        self.level = level;
    }

    pub(crate) fn set_rock_ridge_level(&mut self, level: u8) {
        debug_assert!(self.root.is_none());
        self.rock_ridge_level = level;
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn stats(&self) -> NamespaceStats {
        self.stats
    }

    /// Only called with ids this namespace handed out.
    pub(crate) fn node(&self, id: NodeId) -> &NameNode {
        &self.nodes[id.idx()]
    }

    /// The node behind `id`, or `None` when `id` does not belong to this namespace.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NameNode> {
        self.nodes.get(id.idx())
    }

    /// Children of `id` in insertion order. Empty for files and unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(NameNode::children).unwrap_or_default()
    }

    /// Creates the root node for `object`. The root has an empty name.
    pub(crate) fn insert_root(&mut self, object: ObjectIndex) -> Result<NodeId> {
        debug_assert!(self.root.is_none(), "{} root created twice", self.kind);
        self.nodes.try_reserve(1)?;

        let id = self.next_id()?;
        self.nodes.push(NameNode {
            object,
            parent: None,
            depth: 0,
            specified: String::new(),
            name: String::new(),
            children: Some(Vec::new()),
        });
        self.root = Some(id);
        self.stats.names += 1;
        self.stats.directories += 1;
        Ok(id)
    }

    /// Appends a new node below `parent`.
    ///
    /// Fails if `parent` is not a directory or already holds the maximum number of children.
    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        object: ObjectIndex,
        kind: ObjectKind,
        specified: &str,
        name: String,
    ) -> Result<NodeId> {
        let parent_node = self.node(parent);
        let Some(siblings) = parent_node.children.as_ref() else {
            return Err(IsoMakerError::NotADirectory {
                component: parent_node.specified.clone(),
            });
        };
        if siblings.len() >= MAX_CHILDREN_PER_DIR {
            return Err(IsoMakerError::OutOfRange {
                what: "directory entry count",
                limit: MAX_CHILDREN_PER_DIR,
            });
        }
        let depth = parent_node.depth + 1;

        self.nodes.try_reserve(1)?;
        let id = self.next_id()?;
        if let Some(siblings) = self.nodes[parent.idx()].children.as_mut() {
            if siblings.len() == siblings.capacity() {
                siblings.try_reserve_exact(CHILD_BLOCK)?;
            }
            siblings.push(id);
        }

        let is_dir = kind == ObjectKind::Dir;
        self.nodes.push(NameNode {
            object,
            parent: Some(parent),
            depth,
            specified: specified.to_owned(),
            name,
            children: is_dir.then(Vec::new),
        });
        self.stats.names += 1;
        if is_dir {
            self.stats.directories += 1;
        }
        Ok(id)
    }

    fn next_id(&self) -> Result<NodeId> {
        u32::try_from(self.nodes.len())
            .map(NodeId::from_raw)
            .map_err(|_| IsoMakerError::OutOfRange {
                what: "name node count",
                limit: u32::MAX as usize,
            })
    }

    /// Finds a child by its namespace-legal name (case-insensitive).
    #[must_use]
    pub fn find_child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| names_equal_ignore_case(&self.node(child).name, name))
    }

    /// Finds a child by the name the caller specified (case-insensitive).
    #[must_use]
    pub fn find_child_by_specified_name(&self, parent: NodeId, specified: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| names_equal_ignore_case(&self.node(child).specified, specified))
    }

    /// Absolute path of `id` built from the namespace-legal names.
    pub(crate) fn path_of(&self, id: NodeId) -> String {
        let mut components = Vec::new();
        let mut cursor = Some(id);
        while let Some(node_id) = cursor {
            let node = self.node(node_id);
            if node.parent.is_some() {
                components.push(node.name.as_str());
            }
            cursor = node.parent;
        }
        if components.is_empty() {
            return "/".to_owned();
        }

        let mut path = String::new();
        for component in components.iter().rev() {
            path.push('/');
            path.push_str(component);
        }
        path
    }

    /// Walks the tree children-first without recursion.
    pub fn post_order(&self) -> PostOrder<'_> {
        PostOrder {
            namespace: self,
            stack: self.root.map(|root| vec![(root, 0)]).unwrap_or_default(),
        }
    }

    /// Releases every node exactly once, deepest first. Returns the number of nodes released.
    pub(crate) fn tear_down(&mut self) -> usize {
        let order: Vec<NodeId> = self.post_order().collect();
        debug_assert_eq!(order.len(), self.nodes.len(), "unreachable name nodes");

        #[cfg(debug_assertions)]
        {
            let mut released = vec![false; self.nodes.len()];
            for &id in &order {
                debug_assert!(!released[id.idx()], "name node released twice");
                debug_assert!(
                    self.node(id)
                        .children()
                        .iter()
                        .all(|child| released[child.idx()]),
                    "directory released before its children"
                );
                released[id.idx()] = true;
            }
        }

        self.nodes.clear();
        self.root = None;
        self.stats = NamespaceStats::default();
        order.len()
    }
}

/// Children-first iterator over a namespace tree. See [`Namespace::post_order`].
pub struct PostOrder<'a> {
    namespace: &'a Namespace,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for PostOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (node, cursor) = self.stack.last_mut()?;
            let children = self.namespace.children(*node);
            if let Some(&child) = children.get(*cursor) {
                *cursor += 1;
                self.stack.push((child, 0));
                continue;
            }
            let node = *node;
            self.stack.pop();
            return Some(node);
        }
    }
}

/// Case-insensitive comparison of names with identical byte length.
pub(crate) fn names_equal_ignore_case(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && (a == b
            || a
                .chars()
                .flat_map(char::to_lowercase)
                .eq(b.chars().flat_map(char::to_lowercase)))
}

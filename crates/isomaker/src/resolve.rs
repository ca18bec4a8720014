//! Path resolution within one namespace.
//!
//! Walks an absolute, slash separated path, creating every missing ancestor directory. Before a
//! new directory object is allocated, the other namespaces are searched for a directory with the
//! same specified name at the same position so one logical directory is never duplicated.

use crate::error::{IsoMakerError, Result};
use crate::ids::{NodeId, ObjectIndex};
use crate::maker::IsoMaker;
use crate::namespace::{Namespace, NamespaceKind};
use crate::normalize::normalize_name;
use crate::object::ObjectKind;

/// Where the final component of a path lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target<'p> {
    /// The path designates the namespace root itself.
    Root,
    /// A new entry called `name` below `parent`.
    Child { parent: NodeId, name: &'p str },
}

/// One directory step of a path, after `.` components have been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step<'p> {
    /// A component that remains part of the resolved path; created when missing.
    Enter(&'p str),
    /// A component later cancelled by `..`. Checked against the tree but never created.
    Pass(&'p str),
    /// `..`, clamped at the root.
    Up,
}

/// Path split into the directory steps to walk and the final, unresolved component.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SplitPath<'p> {
    pub(crate) steps: Vec<Step<'p>>,
    pub(crate) last: &'p str,
}

fn invalid(path: &str) -> IsoMakerError {
    IsoMakerError::InvalidName {
        name: path.to_owned(),
    }
}

/// Splits an absolute path. Returns `None` when the path is the root itself.
///
/// Runs of slashes collapse and `.` components vanish. A named component that a later `..`
/// cancels becomes [`Step::Pass`]. A trailing slash, or a final `.`/`..`, is rejected.
pub(crate) fn split_path(path: &str) -> Result<Option<SplitPath<'_>>> {
    if !path.starts_with('/') {
        return Err(invalid(path));
    }
    let rest = path.trim_start_matches('/');
    if rest.is_empty() {
        return Ok(None);
    }
    if rest.ends_with('/') {
        return Err(invalid(path));
    }

    let mut components: Vec<&str> = rest
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    let Some(last) = components.pop() else {
        return Err(invalid(path));
    };
    if last == "." || last == ".." {
        return Err(invalid(path));
    }

    let mut steps: Vec<Step<'_>> = Vec::with_capacity(components.len());
    // Positions in `steps` of the named components not yet cancelled.
    let mut open = Vec::new();
    for component in components {
        if component == ".." {
            if let Some(at) = open.pop() {
                if let Step::Enter(name) = steps[at] {
                    steps[at] = Step::Pass(name);
                }
            }
            steps.push(Step::Up);
        } else {
            open.push(steps.len());
            steps.push(Step::Enter(component));
        }
    }
    Ok(Some(SplitPath { steps, last }))
}

/// Position reached while walking directory steps.
///
/// `trail` holds the existing directories entered below the root. `missing` counts cancelled
/// components that do not exist; nothing below them can match.
struct Walk {
    root: NodeId,
    trail: Vec<NodeId>,
    missing: usize,
}

impl Walk {
    fn new(root: NodeId) -> Self {
        Self {
            root,
            trail: Vec::new(),
            missing: 0,
        }
    }

    fn current(&self) -> NodeId {
        self.trail.last().copied().unwrap_or(self.root)
    }

    fn up(&mut self) {
        if self.missing > 0 {
            self.missing -= 1;
        } else {
            self.trail.pop();
        }
    }

    /// Steps through a cancelled component without creating it.
    fn pass(&mut self, namespace: &Namespace, component: &str) -> Result<()> {
        if self.missing > 0 {
            self.missing += 1;
            return Ok(());
        }
        match namespace.find_child_by_specified_name(self.current(), component) {
            Some(child) if !namespace.node(child).is_dir() => {
                Err(IsoMakerError::NotADirectory {
                    component: component.to_owned(),
                })
            }
            Some(child) => {
                self.trail.push(child);
                Ok(())
            }
            None => {
                self.missing = 1;
                Ok(())
            }
        }
    }
}

/// Read-only resolution of `path` to a node by specified names.
pub(crate) fn lookup(namespace: &Namespace, path: &str) -> Option<NodeId> {
    let split = split_path(path).ok()?;
    let root = namespace.root()?;
    let Some(SplitPath { steps, last }) = split else {
        return Some(root);
    };

    let mut walk = Walk::new(root);
    for step in steps {
        match step {
            Step::Enter(component) => {
                let child = namespace.find_child_by_specified_name(walk.current(), component)?;
                if !namespace.node(child).is_dir() {
                    return None;
                }
                walk.trail.push(child);
            }
            Step::Pass(component) => walk.pass(namespace, component).ok()?,
            Step::Up => walk.up(),
        }
    }
    namespace.find_child_by_specified_name(walk.current(), last)
}

impl IsoMaker {
    /// Resolves the parent of `path` in `kind`, creating missing ancestors on the way.
    ///
    /// `binding` is the object about to be named; it is never reused as an ancestor.
    pub(crate) fn resolve_target<'p>(
        &mut self,
        kind: NamespaceKind,
        path: &'p str,
        binding: ObjectIndex,
    ) -> Result<Target<'p>> {
        let Some(SplitPath { steps, last }) = split_path(path)? else {
            return Ok(Target::Root);
        };

        let root = self.ensure_root(kind, binding)?;
        let mut walk = Walk::new(root);
        for step in steps {
            match step {
                Step::Enter(component) => {
                    let child = self.descend_or_create(kind, walk.current(), component, binding)?;
                    walk.trail.push(child);
                }
                Step::Pass(component) => walk.pass(self.namespace(kind), component)?,
                Step::Up => walk.up(),
            }
        }

        Ok(Target::Child {
            parent: walk.current(),
            name: last,
        })
    }

    fn ensure_root(&mut self, kind: NamespaceKind, binding: ObjectIndex) -> Result<NodeId> {
        if let Some(root) = self.namespace(kind).root() {
            return Ok(root);
        }

        let object = match self.shared_root_object(kind, binding) {
            Some(object) => object,
            None => self.objects.create(ObjectKind::Dir, None)?,
        };
        self.bind_root(kind, object)
    }

    /// Picks an existing object to serve as the root of `kind`.
    ///
    /// Prefers the root of another namespace; failing that, the very first object ever
    /// allocated when it is a still unnamed directory.
    fn shared_root_object(&self, kind: NamespaceKind, binding: ObjectIndex) -> Option<ObjectIndex> {
        let usable = |object: ObjectIndex| {
            object != binding
                && self
                    .objects
                    .get(object)
                    .is_ok_and(|obj| obj.is_dir() && obj.name_in(kind).is_none())
        };

        let from_other = NamespaceKind::ALL
            .into_iter()
            .filter(|&other| other != kind)
            .find_map(|other| {
                let namespace = self.namespace(other);
                let root = namespace.root()?;
                let object = namespace.node(root).object();
                usable(object).then_some(object)
            });
        if from_other.is_some() {
            return from_other;
        }

        let first = self.objects.first()?;
        (!first.is_named() && usable(first.index())).then_some(first.index())
    }

    pub(crate) fn bind_root(&mut self, kind: NamespaceKind, object: ObjectIndex) -> Result<NodeId> {
        let node = self.namespace_mut(kind).insert_root(object)?;
        self.objects.get_mut(object)?.set_name(kind, node);
        tracing::debug!(namespace = %kind, %object, "created namespace root");
        Ok(node)
    }

    fn descend_or_create(
        &mut self,
        kind: NamespaceKind,
        parent: NodeId,
        component: &str,
        binding: ObjectIndex,
    ) -> Result<NodeId> {
        let namespace = self.namespace(kind);
        if let Some(child) = namespace.find_child_by_specified_name(parent, component) {
            if !namespace.node(child).is_dir() {
                return Err(IsoMakerError::NotADirectory {
                    component: component.to_owned(),
                });
            }
            return Ok(child);
        }

        let object = match self.find_dir_across_namespaces(kind, parent, component, binding) {
            Some(object) => {
                tracing::debug!(
                    namespace = %kind,
                    %object,
                    component,
                    "reusing directory object from another namespace"
                );
                object
            }
            None => {
                let object = self.objects.create(ObjectKind::Dir, None)?;
                tracing::debug!(namespace = %kind, %object, component, "created implicit directory");
                object
            }
        };
        self.bind_child(kind, parent, object, component)
    }

    /// Looks for a directory object named `component` below the equivalent of `parent` in every
    /// namespace other than `kind`.
    pub(crate) fn find_dir_across_namespaces(
        &self,
        kind: NamespaceKind,
        parent: NodeId,
        component: &str,
        binding: ObjectIndex,
    ) -> Option<ObjectIndex> {
        let parent_object = self
            .objects
            .get(self.namespace(kind).node(parent).object())
            .ok()?;

        NamespaceKind::ALL
            .into_iter()
            .filter(|&other| other != kind)
            .find_map(|other| {
                let other_parent = parent_object.name_in(other)?;
                let namespace = self.namespace(other);
                let child = namespace.find_child_by_specified_name(other_parent, component)?;
                let object = namespace.node(child).object();
                let candidate = self.objects.get(object).ok()?;
                (object != binding && candidate.is_dir() && candidate.name_in(kind).is_none())
                    .then_some(object)
            })
    }

    /// Names `object` as `specified` below `parent` in namespace `kind`.
    pub(crate) fn bind_child(
        &mut self,
        kind: NamespaceKind,
        parent: NodeId,
        object: ObjectIndex,
        specified: &str,
    ) -> Result<NodeId> {
        let object_kind = self.objects.get(object)?.kind();
        let namespace = self.namespace(kind);
        let name = normalize_name(
            kind,
            namespace.level(),
            specified,
            object_kind == ObjectKind::Dir,
            |candidate| namespace.find_child_by_name(parent, candidate).is_some(),
        )?;

        let node = self
            .namespace_mut(kind)
            .insert_child(parent, object, object_kind, specified, name)?;
        self.objects.get_mut(object)?.set_name(kind, node);
        tracing::debug!(
            namespace = %kind,
            %object,
            specified,
            name = self.namespace(kind).node(node).name(),
            "bound name"
        );
        Ok(node)
    }
}

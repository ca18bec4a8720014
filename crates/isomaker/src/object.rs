use crate::error::{IsoMakerError, Result};
use crate::ids::{NodeId, ObjectIndex};
use crate::namespace::NamespaceKind;
use crate::source::FileSource;

/// Upper bound (exclusive) on object indices.
pub const MAX_OBJECTS: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Dir,
    File,
}

/// The namespace independent identity of a file or directory.
///
/// An object carries at most one name node per namespace. Name nodes reference the object by
/// index; the object refers back to them by `NodeId`.
#[derive(Debug, Clone)]
pub struct FsObject {
    index: ObjectIndex,
    kind: ObjectKind,
    names: [Option<NodeId>; NamespaceKind::COUNT],
    source: Option<FileSource>,
}

impl FsObject {
    #[must_use]
    pub fn index(&self) -> ObjectIndex {
        self.index
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == ObjectKind::Dir
    }

    /// The name node binding this object into `namespace`, if any.
    #[must_use]
    pub fn name_in(&self, namespace: NamespaceKind) -> Option<NodeId> {
        self.names[namespace.index()]
    }

    /// True once the object has a name in at least one namespace.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.names.iter().any(Option::is_some)
    }

    /// Content descriptor. Always `None` for directories.
    #[must_use]
    pub fn source(&self) -> Option<&FileSource> {
        self.source.as_ref()
    }

    pub(crate) fn set_name(&mut self, namespace: NamespaceKind, node: NodeId) {
        debug_assert!(
            self.names[namespace.index()].is_none(),
            "object {} already named in {namespace}",
            self.index
        );
        self.names[namespace.index()] = Some(node);
    }
}

/// Owns every object created by the builder.
#[derive(Debug)]
pub struct ObjectStore {
    objects: Vec<FsObject>,
    limit: usize,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::with_limit(MAX_OBJECTS)
    }
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            objects: Vec::new(),
            limit: limit.min(MAX_OBJECTS),
        }
    }

    /// Allocates a new, unnamed object and returns its index.
    pub fn create(&mut self, kind: ObjectKind, source: Option<FileSource>) -> Result<ObjectIndex> {
        debug_assert!(kind == ObjectKind::File || source.is_none());

        if self.objects.len() >= self.limit {
            return Err(IsoMakerError::OutOfRange {
                what: "object count",
                limit: self.limit,
            });
        }
        self.objects.try_reserve(1)?;

        // `limit` never exceeds `MAX_OBJECTS`, which fits in a `u32`.
        let index = ObjectIndex::from_raw(self.objects.len() as u32);
        self.objects.push(FsObject {
            index,
            kind,
            names: [None; NamespaceKind::COUNT],
            source,
        });
        Ok(index)
    }

    pub fn get(&self, index: ObjectIndex) -> Result<&FsObject> {
        self.objects
            .get(index.idx())
            .ok_or(IsoMakerError::NotFound(index))
    }

    pub(crate) fn get_mut(&mut self, index: ObjectIndex) -> Result<&mut FsObject> {
        self.objects
            .get_mut(index.idx())
            .ok_or(IsoMakerError::NotFound(index))
    }

    /// The very first object ever allocated, if any.
    pub(crate) fn first(&self) -> Option<&FsObject> {
        self.objects.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FsObject> + '_ {
        self.objects.iter()
    }
}

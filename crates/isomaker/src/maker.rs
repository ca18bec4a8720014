use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use isomaker_config::{IsoMakerConfig, MAX_ISO9660_LEVEL, MAX_JOLIET_LEVEL, MAX_ROCK_RIDGE_LEVEL};

use crate::error::{IsoMakerError, Result};
use crate::ids::{NodeId, ObjectIndex};
use crate::namespace::{Namespace, NamespaceKind, NamespaceSet, PostOrder};
use crate::object::{FsObject, ObjectKind, ObjectStore};
use crate::resolve::{self, Target};
use crate::source::{ContentStream, FileSource};

/// Builds the namespace trees of an optical disc image.
///
/// Objects (files and directories) are created unnamed and then bound into one or more
/// namespaces by path. Level configuration is only accepted while every namespace is still
/// empty.
#[derive(Debug)]
pub struct IsoMaker {
    pub(crate) objects: ObjectStore,
    namespaces: [Namespace; NamespaceKind::COUNT],
}

impl Default for IsoMaker {
    fn default() -> Self {
        Self {
            objects: ObjectStore::new(),
            namespaces: [
                Namespace::new(NamespaceKind::Iso9660, 3, 1),
                Namespace::new(NamespaceKind::Joliet, 3, 0),
                Namespace::new(NamespaceKind::Udf, 0, 0),
                Namespace::new(NamespaceKind::Hfs, 0, 0),
            ],
        }
    }
}

impl IsoMaker {
    /// Primary ISO level 3 with Rock Ridge, Joliet level 3, UDF and HFS disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder configured from `config`.
    pub fn with_config(config: &IsoMakerConfig) -> Result<Self> {
        let mut maker = Self::new();
        maker.set_iso9660_level(config.iso9660.level)?;
        maker.set_rock_ridge_level(config.iso9660.rock_ridge_level)?;
        maker.set_joliet_level(config.joliet.level)?;
        maker.set_joliet_rock_ridge_level(config.joliet.rock_ridge_level)?;
        maker
            .namespace_mut(NamespaceKind::Udf)
            .set_level(u8::from(config.udf.enabled));
        maker
            .namespace_mut(NamespaceKind::Hfs)
            .set_level(u8::from(config.hfs.enabled));
        Ok(maker)
    }

    /// Wraps the builder for shared, reference counted ownership.
    pub fn into_shared(self) -> Rc<RefCell<IsoMaker>> {
        Rc::new(RefCell::new(self))
    }

    fn ensure_no_content(&self) -> Result<()> {
        if self.namespaces.iter().any(|ns| ns.root().is_some()) {
            return Err(IsoMakerError::WrongOrder(
                "configuration cannot change after content has been added",
            ));
        }
        Ok(())
    }

    fn check_level(what: &str, level: u8, min: u8, max: u8) -> Result<()> {
        if !(min..=max).contains(&level) {
            return Err(IsoMakerError::InvalidParameter(format!(
                "{what} must be between {min} and {max}, got {level}"
            )));
        }
        Ok(())
    }

    pub fn set_iso9660_level(&mut self, level: u8) -> Result<()> {
        Self::check_level("ISO-9660 level", level, 1, MAX_ISO9660_LEVEL)?;
        self.ensure_no_content()?;
        self.namespace_mut(NamespaceKind::Iso9660).set_level(level);
        Ok(())
    }

    /// Sets the Joliet level; `0` disables the Joliet namespace.
    pub fn set_joliet_level(&mut self, level: u8) -> Result<()> {
        Self::check_level("Joliet level", level, 0, MAX_JOLIET_LEVEL)?;
        self.ensure_no_content()?;
        self.namespace_mut(NamespaceKind::Joliet).set_level(level);
        Ok(())
    }

    /// Sets the Rock Ridge level of the primary namespace.
    pub fn set_rock_ridge_level(&mut self, level: u8) -> Result<()> {
        Self::check_level("Rock Ridge level", level, 0, MAX_ROCK_RIDGE_LEVEL)?;
        self.ensure_no_content()?;
        self.namespace_mut(NamespaceKind::Iso9660)
            .set_rock_ridge_level(level);
        Ok(())
    }

    /// Sets the Rock Ridge level of the Joliet namespace.
    pub fn set_joliet_rock_ridge_level(&mut self, level: u8) -> Result<()> {
        Self::check_level("Joliet Rock Ridge level", level, 0, MAX_ROCK_RIDGE_LEVEL)?;
        self.ensure_no_content()?;
        self.namespace_mut(NamespaceKind::Joliet)
            .set_rock_ridge_level(level);
        Ok(())
    }

    pub fn add_unnamed_dir(&mut self) -> Result<ObjectIndex> {
        let index = self.objects.create(ObjectKind::Dir, None)?;
        tracing::debug!(object = %index, "added unnamed directory");
        Ok(index)
    }

    pub fn add_unnamed_file(&mut self, source: FileSource) -> Result<ObjectIndex> {
        tracing::debug!(source = %source, "adding unnamed file");
        let index = self.objects.create(ObjectKind::File, Some(source))?;
        Ok(index)
    }

    /// Creates a directory and binds it at `path` in every enabled namespace.
    pub fn add_dir(&mut self, path: &str) -> Result<ObjectIndex> {
        let index = self.add_unnamed_dir()?;
        self.obj_set_path(index, NamespaceSet::ALL, path)?;
        Ok(index)
    }

    /// Creates a file backed by a host file and binds it at `path` in every enabled namespace.
    pub fn add_file_with_host_path(
        &mut self,
        path: &str,
        host_path: impl Into<PathBuf>,
    ) -> Result<ObjectIndex> {
        let index = self.add_unnamed_file(FileSource::host_path(host_path))?;
        self.obj_set_path(index, NamespaceSet::ALL, path)?;
        Ok(index)
    }

    /// Creates a stream backed file and binds it at `path` in every enabled namespace.
    pub fn add_file_with_stream(
        &mut self,
        path: &str,
        stream: Arc<dyn ContentStream>,
    ) -> Result<ObjectIndex> {
        let index = self.add_unnamed_file(FileSource::Stream(stream))?;
        self.obj_set_path(index, NamespaceSet::ALL, path)?;
        Ok(index)
    }

    /// Binds `index` at `path` in every enabled namespace selected by `namespaces`.
    ///
    /// Namespaces are handled independently: bindings that succeed are kept even when another
    /// namespace fails, and the error of the last failing namespace is returned.
    pub fn obj_set_path(
        &mut self,
        index: ObjectIndex,
        namespaces: NamespaceSet,
        path: &str,
    ) -> Result<()> {
        self.objects.get(index)?;

        let mut attempted = 0usize;
        let mut failed = Vec::new();
        let mut last_error = None;
        for kind in namespaces.iter() {
            if !self.namespace(kind).is_enabled() {
                continue;
            }
            attempted += 1;
            if let Err(err) = self.set_path_in_one(index, kind, path) {
                failed.push(kind);
                last_error = Some(err);
            }
        }

        let Some(err) = last_error else {
            return Ok(());
        };
        if failed.len() < attempted {
            tracing::warn!(
                object = %index,
                path,
                ?failed,
                error = %err,
                "object bound in some namespaces only"
            );
        }
        Err(err)
    }

    fn set_path_in_one(&mut self, index: ObjectIndex, kind: NamespaceKind, path: &str) -> Result<()> {
        if self.objects.get(index)?.name_in(kind).is_some() {
            return Err(IsoMakerError::WrongOrder(
                "object already has a name in this namespace",
            ));
        }

        match self.resolve_target(kind, path, index)? {
            Target::Root => {
                if self.namespace(kind).root().is_some() {
                    return Err(IsoMakerError::AlreadyExists {
                        namespace: kind,
                        name: "/".to_owned(),
                    });
                }
                if !self.objects.get(index)?.is_dir() {
                    return Err(IsoMakerError::NotADirectory {
                        component: "/".to_owned(),
                    });
                }
                self.bind_root(kind, index)?;
            }
            Target::Child { parent, name } => {
                self.bind_child(kind, parent, index, name)?;
            }
        }
        Ok(())
    }

    pub fn object(&self, index: ObjectIndex) -> Result<&FsObject> {
        self.objects.get(index)
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> impl Iterator<Item = &FsObject> + '_ {
        self.objects.iter()
    }

    #[must_use]
    pub fn namespace(&self, kind: NamespaceKind) -> &Namespace {
        &self.namespaces[kind.index()]
    }

    pub(crate) fn namespace_mut(&mut self, kind: NamespaceKind) -> &mut Namespace {
        &mut self.namespaces[kind.index()]
    }

    /// Resolves `path` by specified names without creating anything.
    #[must_use]
    pub fn lookup_node(&self, kind: NamespaceKind, path: &str) -> Option<NodeId> {
        resolve::lookup(self.namespace(kind), path)
    }

    /// Like [`IsoMaker::lookup_node`] but yields the bound object.
    #[must_use]
    pub fn lookup(&self, kind: NamespaceKind, path: &str) -> Option<ObjectIndex> {
        let node = self.lookup_node(kind, path)?;
        Some(self.namespace(kind).node(node).object())
    }

    /// Absolute path of `index` in `kind`, spelled with namespace-legal names.
    #[must_use]
    pub fn node_path(&self, kind: NamespaceKind, index: ObjectIndex) -> Option<String> {
        let node = self.objects.get(index).ok()?.name_in(kind)?;
        Some(self.namespace(kind).path_of(node))
    }

    /// Children-first traversal of the `kind` tree.
    pub fn post_order(&self, kind: NamespaceKind) -> PostOrder<'_> {
        self.namespace(kind).post_order()
    }
}

impl Drop for IsoMaker {
    fn drop(&mut self) {
        for namespace in &mut self.namespaces {
            let released = namespace.tear_down();
            if released > 0 {
                tracing::trace!(namespace = %namespace.kind(), released, "released name nodes");
            }
        }
    }
}

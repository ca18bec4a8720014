//! Namespace and tree builder for optical disc images.
//!
//! Before a single byte of an image is laid out, the same logical file tree is projected into up
//! to four independent namespaces:
//! - primary ISO-9660 (d-character names, level dependent length limits),
//! - Joliet (UCS-2 names),
//! - UDF and HFS+ (reserved; binding into them reports `NotSupported`).
//!
//! Every file or directory is a single [`FsObject`] owned by the builder. Each namespace holds
//! its own tree of [`NameNode`]s pointing back at those objects, so a directory implicitly
//! created for one namespace is reused rather than duplicated when another namespace needs it.
//!
//! ```
//! use isomaker::{IsoMaker, NamespaceKind};
//!
//! let mut maker = IsoMaker::new();
//! let dir = maker.add_dir("/music/albums").unwrap();
//! assert_eq!(
//!     maker.node_path(NamespaceKind::Iso9660, dir).as_deref(),
//!     Some("/MUSIC/ALBUMS")
//! );
//! ```

mod error;
mod ids;
mod maker;
mod namespace;
mod normalize;
mod object;
mod resolve;
mod source;

pub use error::{IsoMakerError, Result};
pub use ids::{NodeId, ObjectIndex};
pub use maker::IsoMaker;
pub use namespace::{
    NameNode, Namespace, NamespaceKind, NamespaceSet, NamespaceStats, PostOrder, CHILD_BLOCK,
    MAX_CHILDREN_PER_DIR,
};
pub use normalize::{
    is_valid_primary_name, normalize_joliet, normalize_name, normalize_primary,
    ISO9660_L1_BASE_LEN, ISO9660_L1_EXT_LEN, ISO9660_MAX_NAME_LEN, JOLIET_MAX_NAME_LEN,
    MAX_MANGLE_ATTEMPTS,
};
pub use object::{FsObject, ObjectKind, ObjectStore, MAX_OBJECTS};
pub use source::{ContentStream, FileSource};

pub use isomaker_config::IsoMakerConfig;

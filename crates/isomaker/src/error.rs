use std::collections::TryReserveError;

use crate::ids::ObjectIndex;
use crate::namespace::NamespaceKind;

pub type Result<T, E = IsoMakerError> = std::result::Result<T, E>;

/// Errors produced while building the namespace trees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IsoMakerError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("object {0} does not exist")]
    NotFound(ObjectIndex),

    #[error("{what} limit of {limit} reached")]
    OutOfRange { what: &'static str, limit: usize },

    #[error("no unique {namespace} name could be derived from {name:?}")]
    DuplicateName {
        namespace: NamespaceKind,
        name: String,
    },

    #[error("{component:?} is not a directory")]
    NotADirectory { component: String },

    #[error("wrong order: {0}")]
    WrongOrder(&'static str),

    #[error("{0} names are not supported")]
    NotSupported(NamespaceKind),

    #[error("{name:?} already exists in the {namespace} namespace")]
    AlreadyExists {
        namespace: NamespaceKind,
        name: String,
    },

    #[error("invalid path or name {name:?}")]
    InvalidName { name: String },

    #[error("out of memory")]
    OutOfMemory,
}

impl From<TryReserveError> for IsoMakerError {
    fn from(_: TryReserveError) -> Self {
        IsoMakerError::OutOfMemory
    }
}

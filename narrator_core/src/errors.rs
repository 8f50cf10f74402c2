//! Error types shared by the state/path layer.

use thiserror::Error;

use crate::path::Path;

/// Raised when a dotted path string doesn't match any of the addressable shapes
/// in §4.1 (`world.vars.<key>`, `characters.<id>.<field>`, `relationships.<a>|<b>.<field>`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed path '{0}'")]
pub struct MalformedPathError(pub String);

/// Raised by `StateStore::get`/mutation helpers when a segment of an otherwise
/// well-formed path is absent from the snapshot.
///
/// For condition evaluation this is caught and turned into a non-fatal
/// "unsatisfied" result (§4.2); for effect application it aborts the tick (§4.5, §7).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("path {path} not present")]
pub struct PathNotFound {
    /// The path that could not be resolved.
    pub path: Path,
}

impl PathNotFound {
    /// Build a `PathNotFound` for the given path.
    pub fn new(path: Path) -> Self {
        PathNotFound { path }
    }
}

/// Errors mutating a `StateStore` through a resolved path, used by the effect applier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    /// The path doesn't resolve to an existing value (fatal outside `append`/`set`).
    #[error(transparent)]
    NotFound(#[from] PathNotFound),
    /// The stored value at `path` isn't the kind the requested operation needs.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The offending path.
        path: Path,
        /// What the operation required.
        expected: &'static str,
        /// A short description of what was actually there.
        found: &'static str,
    },
}

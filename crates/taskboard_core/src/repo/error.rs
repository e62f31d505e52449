use crate::kv::KvError;
use crate::model::EntityKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity store failure.
///
/// `NotFound` is the only domain error. `Kv` and `InvalidData` are both store
/// failures: the first from the backend, the second from a stored value that
/// cannot be decoded.
#[derive(Debug)]
pub enum RepoError {
    NotFound { kind: EntityKind, id: String },
    Kv(KvError),
    InvalidData { key: String, message: String },
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_store_failure(&self) -> bool {
        !self.is_not_found()
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Kv(err) => write!(f, "store failure: {err}"),
            Self::InvalidData { key, message } => {
                write!(f, "store failure: invalid data at `{key}`: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

//! JSON encoding for stored records and ID indexes.
//!
//! Decode failures carry the offending key and map to `RepoError::InvalidData`.

use super::error::{RepoError, RepoResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn encode_record<T: Serialize>(key: &str, record: &T) -> RepoResult<String> {
    serde_json::to_string(record).map_err(|err| invalid(key, err))
}

pub(crate) fn decode_record<T: DeserializeOwned>(key: &str, raw: &str) -> RepoResult<T> {
    serde_json::from_str(raw).map_err(|err| invalid(key, err))
}

pub(crate) fn encode_index(key: &str, ids: &[String]) -> RepoResult<String> {
    serde_json::to_string(ids).map_err(|err| invalid(key, err))
}

/// Decodes an index value. Must be a JSON array of strings.
pub(crate) fn decode_index(key: &str, raw: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|err| invalid(key, err))
}

fn invalid(key: &str, err: serde_json::Error) -> RepoError {
    RepoError::InvalidData {
        key: key.to_string(),
        message: err.to_string(),
    }
}

use prost_types::value::Kind;
use tonic::Code;
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::proto::{DelRequest, GetRequest};
use crate::store::Store;

/// Deletes `key` so the run starts from an absent key.
///
/// A store that reports the key as not found has reached the same state, so
/// that answer is accepted. Anything else aborts the run.
pub fn reset<S: Store + ?Sized>(store: &mut S, key: &[u8]) -> Result<()> {
    match store.del(DelRequest { key: key.to_vec() }) {
        Ok(_) => {
            debug!(key = %String::from_utf8_lossy(key), "reset target key");
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            debug!(key = %String::from_utf8_lossy(key), "target key already absent");
            Ok(())
        }
        Err(status) => Err(BenchError::from_status("Del", status)),
    }
}

/// Reads `key` back. Absent means not found, or a value with no content.
///
/// A key holding a map or queue is present even though the store refuses to
/// return it as a scalar.
pub fn is_absent<S: Store + ?Sized>(store: &mut S, key: &[u8]) -> Result<bool> {
    match store.get(GetRequest { key: key.to_vec() }) {
        Ok(res) => Ok(matches!(
            res.value,
            None | Some(prost_types::Value {
                kind: None | Some(Kind::NullValue(_))
            })
        )),
        Err(status) if status.code() == Code::NotFound => Ok(true),
        Err(status) if status.code() == Code::InvalidArgument => Ok(false),
        Err(status) => Err(BenchError::from_status("Get", status)),
    }
}

/// Resets `key` and fails if it can still be read back.
pub fn reset_verified<S: Store + ?Sized>(store: &mut S, key: &[u8]) -> Result<()> {
    reset(store, key)?;
    if is_absent(store, key)? {
        Ok(())
    } else {
        Err(BenchError::KeyPresent {
            key: String::from_utf8_lossy(key).into_owned(),
        })
    }
}

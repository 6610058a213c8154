//! Key layout and value encoding shared by every LMDB store.
//!
//! Values are bincode. Composite keys concatenate fixed-width parts so prefix
//! scans over the leading id work: `id(16) ++ version_be(4)` for history,
//! `a(16) ++ b(16)` for relations.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, RoTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::LmdbError;

pub(crate) const ID_LEN: usize = 16;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

/// `id ++ version` with the version big-endian so keys sort by version.
pub(crate) fn version_key(id: &[u8; ID_LEN], version: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(ID_LEN + 4);
    key.extend_from_slice(id);
    key.extend_from_slice(&version.to_be_bytes());
    key
}

pub(crate) fn pair_key(a: &[u8; ID_LEN], b: &[u8; ID_LEN]) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 * ID_LEN);
    key.extend_from_slice(a);
    key.extend_from_slice(b);
    key
}

/// Increment a byte-string prefix to form an exclusive upper bound for range scans.
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) {
    while let Some(last) = prefix.pop() {
        if last < u8::MAX {
            prefix.push(last + 1);
            return;
        }
    }
}

/// Every `(key, value)` whose key starts with `prefix`, in key order.
pub(crate) fn scan_prefix(
    db: Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LmdbError> {
    let mut upper = prefix.to_vec();
    increment_prefix(&mut upper);
    let lower = Bound::Included(prefix);
    let upper_bound = if upper.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(upper.as_slice())
    };
    let bounds = (lower, upper_bound);
    let mut out = Vec::new();
    for entry in db.range(txn, &bounds)? {
        let (key, val) = entry?;
        out.push((key.to_vec(), val.to_vec()));
    }
    Ok(out)
}

/// Split off the trailing 16-byte id of a relation key.
pub(crate) fn trailing_id(key: &[u8]) -> Result<[u8; ID_LEN], LmdbError> {
    if key.len() != 2 * ID_LEN {
        return Err(LmdbError::Corruption(format!(
            "relation key has length {}",
            key.len()
        )));
    }
    let mut id = [0u8; ID_LEN];
    id.copy_from_slice(&key[ID_LEN..]);
    Ok(id)
}

/// The version part of a history key.
pub(crate) fn key_version(key: &[u8]) -> Result<u32, LmdbError> {
    if key.len() != ID_LEN + 4 {
        return Err(LmdbError::Corruption(format!(
            "history key has length {}",
            key.len()
        )));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&key[ID_LEN..]);
    Ok(u32::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_prefix_carries() {
        let mut p = vec![0x01, 0xff];
        increment_prefix(&mut p);
        assert_eq!(p, vec![0x02]);

        let mut all_max = vec![0xff, 0xff];
        increment_prefix(&mut all_max);
        assert!(all_max.is_empty());
    }

    #[test]
    fn version_keys_sort_numerically() {
        let id = [7u8; ID_LEN];
        assert!(version_key(&id, 2) < version_key(&id, 10));
        assert_eq!(key_version(&version_key(&id, 258)).unwrap(), 258);
    }

    #[test]
    fn trailing_id_rejects_bad_length() {
        assert!(trailing_id(&[0u8; 5]).is_err());
        let key = pair_key(&[1u8; ID_LEN], &[2u8; ID_LEN]);
        assert_eq!(trailing_id(&key).unwrap(), [2u8; ID_LEN]);
    }
}

//! Cache key generation.

use super::part::KeyPart;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};

const DEFAULT_MULTIPLIER: i32 = 37;
const DEFAULT_HASHCODE: i32 = 17;
const NULL_UPDATE_HASH: i32 = 1;

/// The shared immutable key used where no real fingerprint applies.
pub static NULL_CACHE_KEY: Lazy<CacheKey> = Lazy::new(CacheKey::null);

/// Order-sensitive composite fingerprint.
///
/// Every update folds one [`KeyPart`] into a running hash and checksum and
/// records the part itself, so equality is exact rather than hash-only.
/// Clones carry their own copy of the history.
#[derive(Debug, Clone, Serialize)]
pub struct CacheKey {
    multiplier: i32,
    hashcode: i32,
    checksum: i64,
    count: i32,
    history: Vec<KeyPart>,
    #[serde(skip)]
    immutable: bool,
}

impl CacheKey {
    pub fn new() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
            hashcode: DEFAULT_HASHCODE,
            checksum: 0,
            count: 0,
            history: Vec::new(),
            immutable: false,
        }
    }

    /// A fresh copy of the null key; any update on it fails.
    pub fn null() -> Self {
        Self {
            immutable: true,
            ..Self::new()
        }
    }

    /// Build a key from an ordered sequence of parts.
    pub fn from_parts<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<KeyPart>,
    {
        let mut key = Self::new();
        for part in parts {
            key.fold(part.into());
        }
        key
    }

    pub fn update(&mut self, part: impl Into<KeyPart>) -> Result<()> {
        if self.immutable {
            return Err(Error::immutable_key("update"));
        }
        self.fold(part.into());
        Ok(())
    }

    /// Apply [`update`](Self::update) to each part in order.
    ///
    /// Nothing is applied when called on the null key.
    pub fn update_all<I, T>(&mut self, parts: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<KeyPart>,
    {
        if self.immutable {
            return Err(Error::immutable_key("update_all"));
        }
        for part in parts {
            self.fold(part.into());
        }
        Ok(())
    }

    fn fold(&mut self, part: KeyPart) {
        let mut base = if part.is_null() {
            NULL_UPDATE_HASH
        } else {
            part.stable_hash()
        };

        self.count = self.count.wrapping_add(1);
        self.checksum = self.checksum.wrapping_add(base as i64);
        base = base.wrapping_mul(self.count);

        self.hashcode = self.multiplier.wrapping_mul(self.hashcode).wrapping_add(base);

        self.history.push(part);
    }

    pub fn update_count(&self) -> usize {
        self.history.len()
    }

    pub fn hash_code(&self) -> i32 {
        self.hashcode
    }

    pub fn checksum(&self) -> i64 {
        self.checksum
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.history
    }

    pub fn is_null_key(&self) -> bool {
        self.immutable
    }

    /// SHA-256 over the canonical JSON encoding, hex encoded.
    ///
    /// Stable across runs, so it can be stored and compared later.
    pub fn digest(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect())
    }
}

impl Default for CacheKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.hashcode != other.hashcode
            || self.checksum != other.checksum
            || self.count != other.count
        {
            return false;
        }
        self.history
            .iter()
            .zip(other.history.iter())
            .all(|(a, b)| a == b)
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hashcode);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hashcode, self.checksum)?;
        for part in &self.history {
            write!(f, ":{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_defaults() {
        let key = CacheKey::new();
        assert_eq!(key.hash_code(), 17);
        assert_eq!(key.checksum(), 0);
        assert_eq!(key.update_count(), 0);
        assert_eq!(key.to_string(), "17:0");
    }

    #[test]
    fn test_update_recurrence() {
        let mut key = CacheKey::new();
        key.update(3).unwrap();
        // count=1, checksum=3, hash = 37*17 + 3*1
        assert_eq!(key.hash_code(), 37 * 17 + 3);
        assert_eq!(key.checksum(), 3);

        key.update(5).unwrap();
        // count=2, checksum=8, hash = 37*prev + 5*2
        assert_eq!(key.hash_code(), 37 * (37 * 17 + 3) + 10);
        assert_eq!(key.checksum(), 8);
        assert_eq!(key.update_count(), 2);
    }

    #[test]
    fn test_null_update_contributes_one() {
        let mut key = CacheKey::new();
        key.update(KeyPart::Null).unwrap();
        assert_eq!(key.checksum(), 1);
        assert_eq!(key.hash_code(), 37 * 17 + 1);
    }

    #[test]
    fn test_equal_keys() {
        let a = CacheKey::from_parts(vec![KeyPart::from(1), "users".into(), KeyPart::Null]);
        let mut b = CacheKey::new();
        b.update(1).unwrap();
        b.update("users").unwrap();
        b.update(None::<i32>).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
    }

    #[test]
    fn test_order_matters() {
        let a = CacheKey::from_parts([1, 2]);
        let b = CacheKey::from_parts([2, 1]);
        assert_ne!(a, b);
        assert_ne!(a.hash_code(), b.hash_code());
        // same multiset, same checksum
        assert_eq!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_hash_collision_resolved_by_history() {
        // "Aa" and "BB" share a string hash
        let a = CacheKey::from_parts(["Aa"]);
        let b = CacheKey::from_parts(["BB"]);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequence_parts_compare_by_elements() {
        let a = CacheKey::from_parts([KeyPart::bytes(vec![1u8, 2])]);
        let b = CacheKey::from_parts([KeyPart::bytes(vec![1u8, 2])]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_null_key_rejects_updates() {
        let mut key = CacheKey::null();
        let err = key.update(1).unwrap_err();
        assert!(err.is_immutable_key());
        assert!(key.update_all([1, 2]).unwrap_err().is_immutable_key());
        assert_eq!(key.update_count(), 0);

        let mut shared = NULL_CACHE_KEY.clone();
        assert!(shared.update("x").is_err());
        assert!(shared.is_null_key());
    }

    #[test]
    fn test_null_key_equals_empty_key() {
        assert_eq!(*NULL_CACHE_KEY, CacheKey::new());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = CacheKey::from_parts(["select", "users"]);
        let snapshot = a.clone();
        let b = a.clone();
        a.update(10).unwrap();
        assert_ne!(a, b);
        assert_eq!(b, snapshot);
        assert_eq!(b.update_count(), 2);
    }

    #[test]
    fn test_display() {
        let key = CacheKey::from_parts([KeyPart::from("a"), KeyPart::from(vec![1, 2])]);
        let expected = format!("{}:{}:a:[1, 2]", key.hash_code(), key.checksum());
        assert_eq!(key.to_string(), expected);
    }

    #[test]
    fn test_digest_is_stable() {
        let a = CacheKey::from_parts([KeyPart::from("a"), KeyPart::from(1)]);
        let b = CacheKey::from_parts([KeyPart::from("a"), KeyPart::from(1)]);
        let c = CacheKey::from_parts([KeyPart::from(1), KeyPart::from("a")]);
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
        assert_eq!(a.digest().unwrap().len(), 64);
    }
}

//! Structural values that can be folded into a [`CacheKey`](super::CacheKey).
//!
//! Hashing is reproducible across process runs: nothing here depends on a
//! randomly seeded hasher. Sequences hash elementwise and compare elementwise.

use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

const SEQUENCE_SEED: i32 = 1;
const SEQUENCE_MULTIPLIER: i32 = 31;
const NULL_ELEMENT_HASH: i32 = 0;
const TRUE_HASH: i32 = 1231;
const FALSE_HASH: i32 = 1237;

/// One contribution to a fingerprint: a statement id, a paging bound, or a
/// bound parameter value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<KeyPart>),
}

impl KeyPart {
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        KeyPart::Bytes(data.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, KeyPart::Null)
    }

    /// Deterministic 32-bit structural hash.
    ///
    /// `Null` hashes to 0 here, which is its weight as a sequence element; a
    /// top-level null update uses 1 instead (see `CacheKey::update`).
    pub fn stable_hash(&self) -> i32 {
        match self {
            KeyPart::Null => NULL_ELEMENT_HASH,
            KeyPart::Bool(true) => TRUE_HASH,
            KeyPart::Bool(false) => FALSE_HASH,
            KeyPart::Int(v) => fold_wide(*v as u64),
            KeyPart::Float(v) => fold_wide(v.to_bits()),
            KeyPart::Str(s) => s.encode_utf16().fold(0i32, |h, unit| {
                h.wrapping_mul(SEQUENCE_MULTIPLIER).wrapping_add(unit as i32)
            }),
            KeyPart::Bytes(bytes) => bytes.iter().fold(SEQUENCE_SEED, |h, b| {
                h.wrapping_mul(SEQUENCE_MULTIPLIER).wrapping_add(*b as i8 as i32)
            }),
            KeyPart::List(items) => items.iter().fold(SEQUENCE_SEED, |h, item| {
                h.wrapping_mul(SEQUENCE_MULTIPLIER).wrapping_add(item.stable_hash())
            }),
        }
    }
}

fn fold_wide(bits: u64) -> i32 {
    (bits ^ (bits >> 32)) as i32
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyPart::Null, KeyPart::Null) => true,
            (KeyPart::Bool(a), KeyPart::Bool(b)) => a == b,
            (KeyPart::Int(a), KeyPart::Int(b)) => a == b,
            // bit equality: NaN matches NaN, 0.0 and -0.0 differ
            (KeyPart::Float(a), KeyPart::Float(b)) => a.to_bits() == b.to_bits(),
            (KeyPart::Str(a), KeyPart::Str(b)) => a == b,
            (KeyPart::Bytes(a), KeyPart::Bytes(b)) => a == b,
            (KeyPart::List(a), KeyPart::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for KeyPart {}

impl Hash for KeyPart {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.stable_hash());
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Null => write!(f, "null"),
            KeyPart::Bool(v) => write!(f, "{}", v),
            KeyPart::Int(v) => write!(f, "{}", v),
            KeyPart::Float(v) => write!(f, "{}", v),
            KeyPart::Str(s) => write!(f, "{}", s),
            KeyPart::Bytes(bytes) => write_sequence(f, bytes.iter().map(|b| *b as i8)),
            KeyPart::List(items) => write_sequence(f, items.iter()),
        }
    }
}

fn write_sequence<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for KeyPart {
            fn from(v: $t) -> Self {
                KeyPart::Int(v as i64)
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

// values past i64::MAX keep their decimal text instead of wrapping
macro_rules! impl_from_wide_uint {
    ($($t:ty),*) => {
        $(impl From<$t> for KeyPart {
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(n) => KeyPart::Int(n),
                    Err(_) => KeyPart::Str(v.to_string()),
                }
            }
        })*
    };
}

impl_from_wide_uint!(u64, usize);

impl From<bool> for KeyPart {
    fn from(v: bool) -> Self {
        KeyPart::Bool(v)
    }
}

impl From<f32> for KeyPart {
    fn from(v: f32) -> Self {
        KeyPart::Float(v as f64)
    }
}

impl From<f64> for KeyPart {
    fn from(v: f64) -> Self {
        KeyPart::Float(v)
    }
}

impl From<char> for KeyPart {
    fn from(v: char) -> Self {
        KeyPart::Str(v.to_string())
    }
}

impl From<&str> for KeyPart {
    fn from(v: &str) -> Self {
        KeyPart::Str(v.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(v: String) -> Self {
        KeyPart::Str(v)
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(KeyPart::Null)
    }
}

impl<T: Into<KeyPart>> From<Vec<T>> for KeyPart {
    fn from(v: Vec<T>) -> Self {
        KeyPart::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for KeyPart {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => KeyPart::Null,
            Value::Bool(b) => KeyPart::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => KeyPart::Int(i),
                (None, Some(u)) => KeyPart::from(u),
                (None, None) => KeyPart::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => KeyPart::Str(s),
            Value::Array(items) => KeyPart::List(items.into_iter().map(KeyPart::from).collect()),
            // serde_json maps iterate in key order, so the pair list is deterministic
            Value::Object(map) => KeyPart::List(
                map.into_iter()
                    .map(|(k, v)| KeyPart::List(vec![KeyPart::Str(k), KeyPart::from(v)]))
                    .collect(),
            ),
        }
    }
}

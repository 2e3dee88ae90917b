//! Structured composite keys.
//!
//! A key is an ordered sequence of typed fields rather than a concatenated
//! string, so `("A", "BC")` and `("AB", "C")` never collide.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::InvalidKey;

/// One component of a composite key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyField {
    /// UTF-8 text.
    Text(String),
    /// Signed integer.
    Integer(i64),
    /// Finite floating-point number.
    Float(FiniteF64),
}

impl KeyField {
    /// Build a floating-point field, rejecting NaN.
    pub fn float(value: f64) -> Result<Self, InvalidKey> {
        FiniteF64::new(value)
            .map(KeyField::Float)
            .ok_or(InvalidKey::NotHashable)
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyField::Text(s) => f.write_str(s),
            KeyField::Integer(n) => write!(f, "{n}"),
            KeyField::Float(x) => write!(f, "{}", x.get()),
        }
    }
}

impl From<&str> for KeyField {
    fn from(value: &str) -> Self {
        KeyField::Text(value.to_string())
    }
}

impl From<String> for KeyField {
    fn from(value: String) -> Self {
        KeyField::Text(value)
    }
}

impl From<i64> for KeyField {
    fn from(value: i64) -> Self {
        KeyField::Integer(value)
    }
}

impl From<i32> for KeyField {
    fn from(value: i32) -> Self {
        KeyField::Integer(value as i64)
    }
}

impl From<u32> for KeyField {
    fn from(value: u32) -> Self {
        KeyField::Integer(value as i64)
    }
}

impl From<FiniteF64> for KeyField {
    fn from(value: FiniteF64) -> Self {
        KeyField::Float(value)
    }
}

/// An `f64` with a stable equality/hash contract.
///
/// NaN is rejected at construction and `-0.0` is normalized to `0.0`, so
/// numerically equal fields always hash equally.
#[derive(Debug, Clone, Copy)]
pub struct FiniteF64(f64);

impl FiniteF64 {
    /// Wrap a value, returning `None` for NaN.
    pub fn new(value: f64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }
        // -0.0 == 0.0 numerically but differs in bit pattern.
        Some(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// The wrapped value.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for FiniteF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FiniteF64 {}

impl Hash for FiniteF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// An immutable composite key derived from one or more fields.
///
/// Equal field sequences always derive equal keys; derivation is pure and
/// independent of call order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    fields: Vec<KeyField>,
}

impl CacheKey {
    /// Build a key from already-converted fields.
    ///
    /// Fails with [`InvalidKey::Empty`] when no fields are supplied.
    pub fn new(fields: Vec<KeyField>) -> Result<Self, InvalidKey> {
        if fields.is_empty() {
            return Err(InvalidKey::Empty);
        }
        Ok(Self { fields })
    }

    /// The key's fields, in order.
    pub fn fields(&self) -> &[KeyField] {
        &self.fields
    }

    /// Number of fields in the key.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: empty keys are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Conversion of caller-supplied fields into a validated [`CacheKey`].
///
/// Implemented for tuples of up to five convertible values, arrays,
/// `Vec<KeyField>`, and `CacheKey` itself.
pub trait IntoCacheKey {
    /// Derive the key, validating the fields.
    fn into_cache_key(self) -> Result<CacheKey, InvalidKey>;
}

impl IntoCacheKey for CacheKey {
    fn into_cache_key(self) -> Result<CacheKey, InvalidKey> {
        Ok(self)
    }
}

impl IntoCacheKey for Vec<KeyField> {
    fn into_cache_key(self) -> Result<CacheKey, InvalidKey> {
        CacheKey::new(self)
    }
}

impl<F: Into<KeyField>, const N: usize> IntoCacheKey for [F; N] {
    fn into_cache_key(self) -> Result<CacheKey, InvalidKey> {
        CacheKey::new(self.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_into_cache_key_for_tuple {
    ($($name:ident : $index:tt),+) => {
        impl<$($name: Into<KeyField>),+> IntoCacheKey for ($($name,)+) {
            fn into_cache_key(self) -> Result<CacheKey, InvalidKey> {
                CacheKey::new(vec![$(self.$index.into()),+])
            }
        }
    };
}

impl_into_cache_key_for_tuple!(A: 0);
impl_into_cache_key_for_tuple!(A: 0, B: 1);
impl_into_cache_key_for_tuple!(A: 0, B: 1, C: 2);
impl_into_cache_key_for_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_into_cache_key_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);

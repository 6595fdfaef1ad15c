//! String payload with inline storage for short strings.
//!
//! Strings of up to [`INLINE_CAPACITY`] bytes live directly inside the
//! [`ThingString`] without touching the heap. Longer strings spill to a
//! separately owned heap buffer. The empty string is always inline, so a
//! default-constructed thing never allocates.

use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Longest string (in bytes) stored without a heap allocation.
pub const INLINE_CAPACITY: usize = 7;

/// An owned UTF-8 string that stores short values inline.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ThingString {
    bytes: SmallVec<[u8; INLINE_CAPACITY]>,
}

impl ThingString {
    /// Create an empty (inline) string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `text` into a new string, reporting allocation failure instead
    /// of aborting.
    pub fn try_from_str(text: &str) -> Result<Self> {
        let mut bytes = SmallVec::new();
        bytes
            .try_reserve(text.len())
            .map_err(|_| Error::OutOfMemory)?;
        bytes.extend_from_slice(text.as_bytes());
        Ok(Self { bytes })
    }

    /// Copy an optional string. An absent string becomes the empty string.
    pub fn from_optional(text: Option<&str>) -> Result<Self> {
        match text {
            Some(text) => Self::try_from_str(text),
            None => Ok(Self::new()),
        }
    }

    /// Deep copy with fallible allocation.
    pub fn try_clone(&self) -> Result<Self> {
        Self::try_from_str(self.as_str())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ever built from `&str`, so the bytes are valid UTF-8.
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True if the string is stored inline (no heap buffer).
    #[inline]
    pub fn is_inline(&self) -> bool {
        !self.bytes.spilled()
    }
}

impl From<&str> for ThingString {
    fn from(text: &str) -> Self {
        Self {
            bytes: SmallVec::from_slice(text.as_bytes()),
        }
    }
}

impl From<String> for ThingString {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

/// Ordinal (byte-wise) ordering, not collation aware.
impl Ord for ThingString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl PartialOrd for ThingString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ThingString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ThingString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

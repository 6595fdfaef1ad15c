//! Keys and values stored in the tree.
//!
//! A [`Thing`] holds exactly one of the supported payload types. A tree is
//! created with one declared [`TypeCode`] for its keys and one for its values,
//! and every thing handed to it must match the declared type.

mod string;
mod text;

pub use string::{ThingString, INLINE_CAPACITY};
pub use text::{min_text_capacity, ELLIPSIS};

use std::fmt;

use crate::error::{Error, Result};

/// The payload types a tree can index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeCode {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// UTF-8 string, compared byte-wise.
    String,
}

impl TypeCode {
    /// Raw four-character code for 32-bit integers (`'LONG'`).
    pub const RAW_INT32: u32 = u32::from_be_bytes(*b"LONG");
    /// Raw four-character code for 64-bit integers (`'LLNG'`).
    pub const RAW_INT64: u32 = u32::from_be_bytes(*b"LLNG");
    /// Raw four-character code for 32-bit floats (`'FLOT'`).
    pub const RAW_FLOAT32: u32 = u32::from_be_bytes(*b"FLOT");
    /// Raw four-character code for 64-bit floats (`'DBLE'`).
    pub const RAW_FLOAT64: u32 = u32::from_be_bytes(*b"DBLE");
    /// Raw four-character code for strings (`'CSTR'`).
    pub const RAW_STRING: u32 = u32::from_be_bytes(*b"CSTR");

    pub const ALL: [TypeCode; 5] = [
        TypeCode::Int32,
        TypeCode::Int64,
        TypeCode::Float32,
        TypeCode::Float64,
        TypeCode::String,
    ];

    pub fn raw(self) -> u32 {
        match self {
            TypeCode::Int32 => Self::RAW_INT32,
            TypeCode::Int64 => Self::RAW_INT64,
            TypeCode::Float32 => Self::RAW_FLOAT32,
            TypeCode::Float64 => Self::RAW_FLOAT64,
            TypeCode::String => Self::RAW_STRING,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeCode::Int32 => "int32",
            TypeCode::Int64 => "int64",
            TypeCode::Float32 => "float",
            TypeCode::Float64 => "double",
            TypeCode::String => "string",
        }
    }

    /// Look a type up by its human readable name (as printed by `Display`).
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownTypeName(name.to_string()))
    }
}

impl TryFrom<u32> for TypeCode {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.raw() == raw)
            .ok_or(Error::UnsupportedType(raw))
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single key or value.
///
/// The default thing is the empty string, which is stored inline and owns
/// no heap memory.
#[derive(Clone, Debug, PartialEq)]
pub enum Thing {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(ThingString),
}

impl Default for Thing {
    fn default() -> Self {
        Thing::String(ThingString::new())
    }
}

impl Thing {
    /// Build a string thing. `None` becomes the empty string.
    pub fn string(text: Option<&str>) -> Result<Self> {
        ThingString::from_optional(text).map(Thing::String)
    }

    pub fn type_code(&self) -> TypeCode {
        match self {
            Thing::Int32(_) => TypeCode::Int32,
            Thing::Int64(_) => TypeCode::Int64,
            Thing::Float32(_) => TypeCode::Float32,
            Thing::Float64(_) => TypeCode::Float64,
            Thing::String(_) => TypeCode::String,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Thing::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Thing::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Thing::Float32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Thing::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Thing::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Deep copy. Numeric things are copied bitwise; strings get a fresh
    /// buffer, so the copy never aliases the original.
    pub fn try_clone(&self) -> Result<Self> {
        match self {
            Thing::String(s) => s.try_clone().map(Thing::String),
            other => Ok(other.clone()),
        }
    }

    /// Free any heap buffer and reset to the empty string.
    pub fn release(&mut self) {
        *self = Thing::default();
    }

    /// Check that this thing has the declared type.
    pub fn expect_type(&self, expected: TypeCode) -> Result<()> {
        let found = self.type_code();
        if found == expected {
            Ok(())
        } else {
            Err(Error::TypeMismatch { expected, found })
        }
    }
}

impl From<i32> for Thing {
    fn from(v: i32) -> Self {
        Thing::Int32(v)
    }
}

impl From<i64> for Thing {
    fn from(v: i64) -> Self {
        Thing::Int64(v)
    }
}

impl From<f32> for Thing {
    fn from(v: f32) -> Self {
        Thing::Float32(v)
    }
}

impl From<f64> for Thing {
    fn from(v: f64) -> Self {
        Thing::Float64(v)
    }
}

impl From<&str> for Thing {
    fn from(v: &str) -> Self {
        Thing::String(ThingString::from(v))
    }
}

impl From<String> for Thing {
    fn from(v: String) -> Self {
        Thing::String(ThingString::from(v))
    }
}

impl fmt::Display for Thing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thing::Int32(v) => write!(f, "{v}"),
            Thing::Int64(v) => write!(f, "{v}"),
            Thing::Float32(v) => f.write_str(&text::format_f32(*v)),
            Thing::Float64(v) => f.write_str(&text::format_f64(*v)),
            Thing::String(s) => f.write_str(s.as_str()),
        }
    }
}

/// Deep-copy `src` onto the end of `dest`.
///
/// If any allocation fails, every thing appended by this call is released
/// again and `dest` is left at its original length.
pub fn copy_things(dest: &mut Vec<Thing>, src: &[Thing]) -> Result<()> {
    let start = dest.len();
    if dest.try_reserve(src.len()).is_err() {
        return Err(Error::OutOfMemory);
    }
    for thing in src {
        match thing.try_clone() {
            Ok(copy) => dest.push(copy),
            Err(err) => {
                dest.truncate(start);
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Release every thing in the slice, leaving each as the empty string.
pub fn release_things(things: &mut [Thing]) {
    for thing in things {
        thing.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_inline_string() {
        match Thing::default() {
            Thing::String(s) => {
                assert!(s.is_empty());
                assert!(s.is_inline());
            }
            other => panic!("unexpected default {other:?}"),
        }
    }

    #[test]
    fn test_raw_type_codes() {
        for t in TypeCode::ALL {
            assert_eq!(TypeCode::try_from(t.raw()), Ok(t));
            assert_eq!(TypeCode::from_name(t.name()), Ok(t));
        }
        assert_eq!(TypeCode::RAW_INT32, 0x4C4F_4E47);
        assert_eq!(
            TypeCode::try_from(u32::from_be_bytes(*b"BOOL")),
            Err(Error::UnsupportedType(u32::from_be_bytes(*b"BOOL")))
        );
        assert!(matches!(
            TypeCode::from_name("bool"),
            Err(Error::UnknownTypeName(_))
        ));
    }

    #[test]
    fn test_expect_type() {
        assert!(Thing::from(1i32).expect_type(TypeCode::Int32).is_ok());
        assert_eq!(
            Thing::from(1i64).expect_type(TypeCode::Int32),
            Err(Error::TypeMismatch {
                expected: TypeCode::Int32,
                found: TypeCode::Int64,
            })
        );
    }

    #[test]
    fn test_copy_and_release_array() {
        let src = vec![
            Thing::from("short"),
            Thing::from("definitely a long string"),
            Thing::string(None).unwrap(),
        ];
        let mut dest = vec![Thing::from(0i32)];
        copy_things(&mut dest, &src).unwrap();
        assert_eq!(dest.len(), 4);
        assert_eq!(&dest[1..], &src[..]);

        release_things(&mut dest[1..]);
        assert!(dest[1..].iter().all(|t| *t == Thing::default()));
        assert_eq!(dest[0], Thing::from(0i32));
    }

    #[test]
    fn test_release_numeric_resets_to_empty_string() {
        let mut t = Thing::from(42i64);
        t.release();
        assert_eq!(t, Thing::default());
    }
}

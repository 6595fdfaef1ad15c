//! Conversion between things and human readable text.

use super::{Thing, ThingString, TypeCode};
use crate::error::{Error, Result};

/// Marker appended to strings clipped by [`Thing::to_text`].
pub const ELLIPSIS: &str = "...";

/// Widest float rendering produced by [`format_f64`] (scientific form of a
/// negative subnormal with 17 significant digits).
const FLOAT_WIDTH: usize = 24;

/// Smallest capacity accepted by [`Thing::to_text`] for each type.
pub fn min_text_capacity(type_code: TypeCode) -> usize {
    match type_code {
        TypeCode::Int32 => "-2147483648".len(),
        TypeCode::Int64 => "-9223372036854775808".len(),
        TypeCode::Float32 | TypeCode::Float64 => FLOAT_WIDTH,
        TypeCode::String => ELLIPSIS.len() + 1,
    }
}

// Shortest round-trip form, switching to scientific notation when the plain
// form would not fit the float width.
pub(super) fn format_f32(v: f32) -> String {
    let plain = v.to_string();
    if plain.len() <= FLOAT_WIDTH {
        plain
    } else {
        format!("{v:e}")
    }
}

pub(super) fn format_f64(v: f64) -> String {
    let plain = v.to_string();
    if plain.len() <= FLOAT_WIDTH {
        plain
    } else {
        format!("{v:e}")
    }
}

fn parse_error(text: &str, type_code: TypeCode) -> Error {
    Error::Parse {
        text: text.to_string(),
        type_code,
    }
}

impl Thing {
    /// Convert human readable text into a thing of the given type.
    ///
    /// Numbers may be surrounded by whitespace. String text is copied as-is.
    pub fn parse(text: &str, type_code: TypeCode) -> Result<Thing> {
        let trimmed = text.trim();
        match type_code {
            TypeCode::Int32 => trimmed
                .parse()
                .map(Thing::Int32)
                .map_err(|_| parse_error(text, type_code)),
            TypeCode::Int64 => trimmed
                .parse()
                .map(Thing::Int64)
                .map_err(|_| parse_error(text, type_code)),
            TypeCode::Float32 => trimmed
                .parse()
                .map(Thing::Float32)
                .map_err(|_| parse_error(text, type_code)),
            TypeCode::Float64 => trimmed
                .parse()
                .map(Thing::Float64)
                .map_err(|_| parse_error(text, type_code)),
            TypeCode::String => ThingString::try_from_str(text).map(Thing::String),
        }
    }

    /// Render this thing as text of at most `capacity` bytes.
    ///
    /// Numbers need at least [`min_text_capacity`] bytes or the call fails
    /// with [`Error::BufferTooSmall`]. Strings that do not fit are clipped
    /// and end in `"..."`.
    pub fn to_text(&self, type_code: TypeCode, capacity: usize) -> Result<String> {
        self.expect_type(type_code)?;

        let needed = min_text_capacity(type_code);
        if capacity < needed {
            return Err(Error::BufferTooSmall { needed, capacity });
        }

        let Thing::String(s) = self else {
            return Ok(self.to_string());
        };

        let text = s.as_str();
        if text.len() <= capacity {
            return Ok(text.to_string());
        }

        let mut keep = capacity - ELLIPSIS.len();
        while !text.is_char_boundary(keep) {
            keep -= 1;
        }
        let mut out = String::with_capacity(keep + ELLIPSIS.len());
        out.push_str(&text[..keep]);
        out.push_str(ELLIPSIS);
        Ok(out)
    }
}

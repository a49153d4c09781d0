//! Applying a [`ResponseLayout`] to a payload segment.

use crate::error::{CodecError, CodecResult};
use crate::layout::{FieldLayout, ResponseLayout};
use crate::token::strip_hex_prefix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How out-of-range layout positions are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Any position past the payload is an [`CodecError::ExtractionBounds`].
    #[default]
    Strict,
    /// Ranges are clamped to the tokens present (possibly empty); a single
    /// offset past the payload is still an error.
    Lenient,
}

/// One extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// From [`FieldLayout::Offset`].
    Token(String),
    /// From [`FieldLayout::Range`].
    Tokens(Vec<String>),
    /// From [`FieldLayout::StringRange`].
    Text(String),
}

impl FieldValue {
    /// Get the token if this is a single-token value.
    pub fn as_token(&self) -> Option<&str> {
        match self {
            FieldValue::Token(t) => Some(t),
            _ => None,
        }
    }

    /// Get the tokens if this is a range value.
    pub fn as_tokens(&self) -> Option<&[String]> {
        match self {
            FieldValue::Tokens(t) => Some(t),
            _ => None,
        }
    }

    /// Get the text if this is a decoded string value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Extracted fields keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    /// Look up a field.
    pub fn get(&self, name: &str) -> CodecResult<&FieldValue> {
        self.0
            .get(name)
            .ok_or_else(|| CodecError::MissingField(name.to_string()))
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no fields were extracted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Apply a layout to a payload segment.
pub fn extract_fields(
    payload: &[String],
    layout: &ResponseLayout,
    mode: ExtractMode,
) -> CodecResult<FieldMap> {
    let mut fields = BTreeMap::new();
    for field in layout.fields() {
        let value = extract_one(payload, &field.name, field.at, mode)?;
        fields.insert(field.name.clone(), value);
    }
    Ok(FieldMap(fields))
}

fn extract_one(
    payload: &[String],
    name: &str,
    at: FieldLayout,
    mode: ExtractMode,
) -> CodecResult<FieldValue> {
    at.validate(name)?;
    match at {
        FieldLayout::Offset(i) => payload
            .get(i)
            .map(|t| FieldValue::Token(t.clone()))
            .ok_or_else(|| bounds(name, i, payload.len())),
        FieldLayout::Range(start, end) => {
            Ok(FieldValue::Tokens(slice(payload, name, start, end, mode)?.to_vec()))
        }
        FieldLayout::StringRange(start, end) => {
            let tokens = slice(payload, name, start, end, mode)?;
            Ok(FieldValue::Text(decode_hex_text(name, tokens)?))
        }
    }
}

fn slice<'a>(
    payload: &'a [String],
    name: &str,
    start: usize,
    end: usize,
    mode: ExtractMode,
) -> CodecResult<&'a [String]> {
    if end < payload.len() {
        return Ok(&payload[start..=end]);
    }
    match mode {
        ExtractMode::Strict => Err(bounds(name, end, payload.len())),
        ExtractMode::Lenient => Ok(&payload[start.min(payload.len())..]),
    }
}

fn bounds(name: &str, index: usize, len: usize) -> CodecError {
    CodecError::ExtractionBounds {
        field: name.to_string(),
        index,
        len,
    }
}

/// Decode hex byte tokens to text.
///
/// Tokens are concatenated (each may carry a `0x` prefix) and hex-decoded.
/// NUL bytes are padding and are dropped wherever they appear; the remaining
/// bytes must be UTF-8.
pub fn decode_hex_text(field: &str, tokens: &[String]) -> CodecResult<String> {
    let mut joined = String::with_capacity(tokens.len() * 2);
    for token in tokens {
        let digits = strip_hex_prefix(token);
        // each token is exactly one byte
        if digits.is_empty() || digits.len() > 2 {
            return Err(CodecError::validation(
                field,
                format!("token '{}' is not a single byte", token),
            ));
        }
        if digits.len() == 1 {
            joined.push('0');
        }
        joined.push_str(digits);
    }
    let bytes = hex::decode(&joined)
        .map_err(|e| CodecError::validation(field, format!("bad hex '{}': {}", joined, e)))?;
    let text: Vec<u8> = bytes.into_iter().filter(|&b| b != 0).collect();
    String::from_utf8(text).map_err(|_| CodecError::validation(field, "text is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_string_range_drops_nul_bytes() {
        let layout = ResponseLayout::new().string("name", 0, 2);
        let fields = extract_fields(&tokens(&["00", "41", "00"]), &layout, ExtractMode::Strict)
            .unwrap();
        assert_eq!(fields.get("name").unwrap().as_text(), Some("A"));
    }

    #[test]
    fn test_string_range_with_prefixes() {
        let text = decode_hex_text("fw", &tokens(&["0x4e", "0x49", "0x43", "0x00"])).unwrap();
        assert_eq!(text, "NIC");
    }

    #[test]
    fn test_offset_and_range() {
        let payload = tokens(&["10", "11", "12", "13"]);
        let layout = ResponseLayout::new().offset("first", 0).range("rest", 1, 3);
        let fields = extract_fields(&payload, &layout, ExtractMode::Strict).unwrap();
        assert_eq!(fields.get("first").unwrap().as_token(), Some("10"));
        assert_eq!(
            fields.get("rest").unwrap().as_tokens().unwrap(),
            &tokens(&["11", "12", "13"])[..]
        );
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_strict_out_of_range() {
        let payload = tokens(&["10", "11"]);
        let layout = ResponseLayout::new().range("r", 1, 5);
        let err = extract_fields(&payload, &layout, ExtractMode::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionBounds);
        assert_eq!(
            err,
            CodecError::ExtractionBounds {
                field: "r".into(),
                index: 5,
                len: 2
            }
        );
    }

    #[test]
    fn test_lenient_clamps_ranges() {
        let payload = tokens(&["10", "11"]);
        let layout = ResponseLayout::new().range("r", 1, 5).range("gone", 4, 6);
        let fields = extract_fields(&payload, &layout, ExtractMode::Lenient).unwrap();
        assert_eq!(fields.get("r").unwrap().as_tokens().unwrap(), &tokens(&["11"])[..]);
        assert!(fields.get("gone").unwrap().as_tokens().unwrap().is_empty());

        let layout = ResponseLayout::new().offset("o", 2);
        let err = extract_fields(&payload, &layout, ExtractMode::Lenient).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionBounds);
    }

    #[test]
    fn test_bad_hex_and_utf8() {
        let err = decode_hex_text("f", &tokens(&["zz"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = decode_hex_text("f", &tokens(&["ff", "fe"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_multi_byte_tokens_rejected() {
        let err = decode_hex_text("f", &tokens(&["123", "456"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = decode_hex_text("f", &tokens(&["4142", "43"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = decode_hex_text("f", &tokens(&["0x"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert_eq!(decode_hex_text("f", &tokens(&["0x41", "a"])).unwrap(), "A\n");
    }

    #[test]
    fn test_missing_field_lookup() {
        let fields = FieldMap::default();
        assert_eq!(fields.get("x").unwrap_err().kind(), ErrorKind::Lookup);
    }
}

//! Textual token convention shared by requests and responses.
//!
//! Every frame byte travels as a hexadecimal text token. Request tokens are
//! emitted as `0x` followed by at least two lowercase digits; response tokens
//! may come with or without the prefix.

use crate::error::{CodecError, CodecResult};

/// Render a value as a frame token (`0x00`, `0x1f`, `0x1f00`).
pub fn hex_token(value: u32) -> String {
    format!("0x{:02x}", value)
}

/// Render a byte slice as frame tokens.
pub fn hex_tokens(bytes: &[u8]) -> Vec<String> {
    bytes.iter().map(|&b| hex_token(b as u32)).collect()
}

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(token: &str) -> &str {
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token)
}

/// Parse one hexadecimal token.
pub fn parse_token(field: &str, token: &str) -> CodecResult<u32> {
    let digits = strip_hex_prefix(token);
    if digits.is_empty() {
        return Err(CodecError::validation(field, "empty token"));
    }
    u32::from_str_radix(digits, 16)
        .map_err(|_| CodecError::validation(field, format!("'{}' is not a hex token", token)))
}

/// Parse a run of byte tokens as one big-endian value.
pub fn parse_be(field: &str, tokens: &[String]) -> CodecResult<u32> {
    if tokens.len() > 4 {
        return Err(CodecError::validation(
            field,
            format!("{} tokens do not fit in 32 bits", tokens.len()),
        ));
    }
    tokens.iter().try_fold(0u32, |acc, token| {
        let byte = parse_token(field, token)?;
        if byte > 0xFF {
            return Err(CodecError::validation(
                field,
                format!("'{}' is wider than one byte", token),
            ));
        }
        Ok((acc << 8) | byte)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_token() {
        assert_eq!(hex_token(0), "0x00");
        assert_eq!(hex_token(0x1f), "0x1f");
        assert_eq!(hex_token(0x1f00), "0x1f00");
        assert_eq!(hex_tokens(&[1, 0xab]), vec!["0x01", "0xab"]);
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("f", "0x1F").unwrap(), 0x1f);
        assert_eq!(parse_token("f", "41").unwrap(), 0x41);
        assert!(parse_token("f", "zz").is_err());
        assert!(parse_token("f", "0x").is_err());
    }

    #[test]
    fn test_parse_be() {
        let tokens = vec!["00".to_string(), "05".to_string()];
        assert_eq!(parse_be("reason", &tokens).unwrap(), 5);

        let tokens = vec!["7f".to_string(), "0xff".to_string()];
        assert_eq!(parse_be("reason", &tokens).unwrap(), 0x7fff);

        let tokens = vec!["100".to_string()];
        assert!(parse_be("reason", &tokens).is_err());
    }
}

//! Filesystem-safe names for submitted answers
//!
//! Answers are untrusted text: they may contain slashes, dots, spaces, `%` or
//! any unicode. Every UTF-8 byte outside `[A-Za-z0-9]` is written as `%XX`
//! (uppercase hex), so a token is always a valid path segment. The empty
//! answer maps to [`BLANK`], which cannot collide with an encoded token
//! because `_` is never emitted.

use crate::error::DecodeError;

/// Token used for the empty answer
pub const BLANK: &str = "__blank__";

/// Encode `text` into a token made only of `[A-Za-z0-9%]`
pub fn encode(text: &str) -> String {
    if text.is_empty() {
        return BLANK.to_string();
    }

    let mut token = String::with_capacity(text.len() * 3);
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() {
            token.push(byte as char);
        } else {
            token.push_str(&format!("%{:02X}", byte));
        }
    }
    token
}

/// Decode a token produced by [`encode`]
///
/// # Errors
///
/// Returns a [`DecodeError`] for empty tokens, characters outside the token
/// alphabet, truncated or non-hex escapes, and escapes that do not form UTF-8.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    if token == BLANK {
        return Ok(String::new());
    }
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = token.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let byte = bytes
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                    .ok_or(DecodeError::BadEscape(i))?;
                decoded.push(byte);
                i += 3;
            }
            byte if byte.is_ascii_alphanumeric() => {
                decoded.push(byte);
                i += 1;
            }
            _ => {
                let c = token[i..].chars().next().unwrap_or('\u{FFFD}');
                return Err(DecodeError::InvalidChar(c));
            }
        }
    }

    Ok(String::from_utf8(decoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_uses_sentinel() {
        assert_eq!(encode(""), BLANK);
        assert_eq!(decode(BLANK).unwrap(), "");
    }

    #[test]
    fn test_alphanumerics_pass_through() {
        assert_eq!(encode("abcXYZ0129"), "abcXYZ0129");
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode("a/b"), "a%2Fb");
        assert_eq!(encode("100%"), "100%25");
        assert_eq!(encode("-42"), "%2D42");
        assert_eq!(encode("x_y.z~"), "x%5Fy%2Ez%7E");
        assert_eq!(encode("two words"), "two%20words");
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn test_sentinel_text_round_trips() {
        let token = encode(BLANK);
        assert_ne!(token, BLANK);
        assert_eq!(decode(&token).unwrap(), BLANK);
    }

    #[test]
    fn test_lowercase_escape_is_accepted() {
        assert_eq!(decode("a%2fb").unwrap(), "a/b");
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
        assert_eq!(decode("abc%"), Err(DecodeError::BadEscape(3)));
        assert_eq!(decode("abc%2"), Err(DecodeError::BadEscape(3)));
        assert_eq!(decode("%+1"), Err(DecodeError::BadEscape(0)));
        assert_eq!(decode("%GG"), Err(DecodeError::BadEscape(0)));
        assert_eq!(decode("a b"), Err(DecodeError::InvalidChar(' ')));
        assert_eq!(decode("a.b"), Err(DecodeError::InvalidChar('.')));
        assert_eq!(decode("ü"), Err(DecodeError::InvalidChar('ü')));
        assert!(matches!(decode("%FF%FE"), Err(DecodeError::Utf8(_))));
    }
}

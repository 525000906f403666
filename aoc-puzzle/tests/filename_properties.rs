//! Property-based tests for the answer file name encoding

use aoc_puzzle::filename::{BLANK, decode, encode};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any string survives encoding, including `%`, `/`, dots and unicode
    #[test]
    fn prop_decode_inverts_encode(text in "\\PC*") {
        prop_assert_eq!(decode(&encode(&text)).unwrap(), text);
    }

    #[test]
    fn prop_decode_inverts_encode_for_path_like_text(text in "[./%_~ -]{0,8}[a-z0-9]{0,8}[./%]{0,4}") {
        prop_assert_eq!(decode(&encode(&text)).unwrap(), text);
    }

    /// Tokens are a single safe path segment
    #[test]
    fn prop_encoded_alphabet(text in "\\PC*") {
        let token = encode(&text);
        if text.is_empty() {
            prop_assert_eq!(token.as_str(), BLANK);
        } else {
            prop_assert!(
                token.chars().all(|c| c.is_ascii_alphanumeric() || c == '%'),
                "token {:?} has characters outside [A-Za-z0-9%]",
                token
            );
            prop_assert!(!token.starts_with('.'));
        }
    }

    /// Distinct answers never share a file
    #[test]
    fn prop_encoding_is_injective(a in "\\PC{0,12}", b in "\\PC{0,12}") {
        prop_assume!(a != b);
        prop_assert_ne!(encode(&a), encode(&b));
    }
}

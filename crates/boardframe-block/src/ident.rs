//! Block identifiers.

use rand::{rng, RngCore};

/// Symbols used in identifiers: `0-9a-z`.
pub const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier length used for new blocks.
pub const DEFAULT_ID_LENGTH: usize = 21;

/// Generate a random identifier of exactly `length` symbols.
///
/// Each symbol is one byte from the thread-local CSPRNG reduced modulo 36.
pub fn generate_identifier(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rng().fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|byte| ALPHABET[usize::from(byte % 36)] as char)
        .collect()
}

/// Returns true if `candidate` has `length` symbols, all from [`ALPHABET`].
pub fn is_identifier(candidate: &str, length: usize) -> bool {
    candidate.len() == length
        && candidate
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn ten_thousand_identifiers_are_distinct() {
        let ids: HashSet<String> = (0..10_000)
            .map(|_| generate_identifier(DEFAULT_ID_LENGTH))
            .collect();

        assert_eq!(ids.len(), 10_000);
        assert!(ids.iter().all(|id| is_identifier(id, DEFAULT_ID_LENGTH)));
    }

    #[test]
    fn zero_length_is_empty() {
        assert_eq!(generate_identifier(0), "");
    }

    #[test]
    fn rejects_foreign_symbols() {
        assert!(is_identifier("abc123", 6));
        assert!(!is_identifier("ABC123", 6));
        assert!(!is_identifier("abc-12", 6));
        assert!(!is_identifier("abc12", 6));
    }

    proptest! {
        #[test]
        fn length_is_exact(length in 0usize..128) {
            let id = generate_identifier(length);
            prop_assert!(is_identifier(&id, length));
        }
    }
}

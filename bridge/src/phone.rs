use sha2::{Digest, Sha256};

/// Normalize a phone number by dropping every non-digit character.
///
/// `+1 (234) 567-8900` becomes `12345678900`. No length or country-code
/// validation happens here: garbage input normalizes to an empty string and
/// is still accepted downstream.
pub fn normalize(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Hash a normalized phone number the way Meta CAPI matches it: lowercase
/// first, then SHA-256, hex encoded. Lowercasing is a no-op on digits but the
/// ordering is part of the match contract.
pub fn hash(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

/// Mask a phone number for logging, keeping only the last four characters.
pub fn mask(phone: &str) -> String {
    let visible = phone.len().saturating_sub(4);
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_everything_but_digits() {
        assert_eq!(normalize("+1 (234) 567-8900"), "12345678900");
        assert_eq!(normalize("+91-9876543210"), "919876543210");
        assert_eq!(normalize("no digits at all"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("+1 (234) 567-8900");
        assert_eq!(normalize(&once), once);
        assert!(once.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn hash_matches_known_vectors() {
        assert_eq!(
            hash("1234567890"),
            "c775e7b757ede630cd0aa1113bd102661ab38829ca52a6422ab782862f268646"
        );
        assert_eq!(
            hash("919876543210"),
            "92b5072176e723878b5e06ff3ca61898e4eb74e8c46642a0f2db800b17364ab0"
        );
    }

    #[test]
    fn hash_is_deterministic_and_hex() {
        let digest = hash(&normalize("+91 98765 43210"));
        assert_eq!(digest, hash("919876543210"));
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn empty_phone_still_hashes() {
        // Degenerate input is accepted, never rejected
        assert_eq!(
            hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask("+919876543210"), "*********3210");
        assert_eq!(mask("123"), "123");
    }
}

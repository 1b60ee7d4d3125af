use sha1::{Digest, Sha1};

/// Hex SHA-1 of `name` followed by `salt`.
///
/// Learners never type this password; it only has to be reproducible so
/// that accounts created earlier stay reachable.
pub fn derive_password(name: &str, salt: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(name.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_digests() {
        assert_eq!(derive_password("", ""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(derive_password("ab", "c"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn salt_changes_the_password() {
        assert_ne!(derive_password("student", "one"), derive_password("student", "two"));
        assert_eq!(derive_password("student", "one").len(), 40);
    }
}

//! Names and digests of generated documents.

use crate::error::{PaginateError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// Hex digits of the wrapper fragment suffix.
const SHORT_DIGEST_LEN: usize = 8;

/// SHA-256 of `text` as lowercase hex.
#[must_use]
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[must_use]
pub fn short_digest(text: &str) -> String {
    let mut digest = content_hash(text);
    digest.truncate(SHORT_DIGEST_LEN);
    digest
}

/// `<Fragment>_Pagination_Query`
#[must_use]
pub fn pagination_query_name(fragment: &str) -> String {
    format!("{fragment}_Pagination_Query")
}

/// `<Fragment>_<digest of its arguments>`
#[must_use]
pub fn wrapper_fragment_name(fragment: &str, canonical_arguments: &str) -> String {
    format!("{fragment}_{}", short_digest(canonical_arguments))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Claim {
    Authored,
    Generated(String),
}

/// Names taken within one run.
///
/// Seeded with every authored document name. Generated names are claimed
/// together with the hash of the content they name: claiming a name again
/// with the same content is a no-op, anything else is a collision.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: DashMap<String, Claim>,
}

impl NameRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry already holding `authored` names.
    pub fn seeded<I, S>(authored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        for name in authored {
            registry.names.insert(name.into(), Claim::Authored);
        }
        registry
    }

    /// Claim `name` for generated content hashing to `hash`.
    pub fn claim(&self, name: &str, hash: &str) -> Result<()> {
        match self.names.entry(name.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(Claim::Generated(hash.to_string()));
                Ok(())
            }
            Entry::Occupied(entry) => match entry.get() {
                Claim::Generated(existing) if existing == hash => Ok(()),
                _ => {
                    tracing::debug!(name, "generated name already taken");
                    Err(PaginateError::NameCollision {
                        name: name.to_string(),
                    })
                }
            },
        }
    }

    /// Give up a generated claim, e.g. when the document owning it failed.
    pub fn release(&self, name: &str) {
        self.names
            .remove_if(name, |_, claim| matches!(claim, Claim::Generated(_)));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(short_digest(""), "e3b0c442");
    }

    #[test]
    fn test_names() {
        assert_eq!(pagination_query_name("UserFriends"), "UserFriends_Pagination_Query");
        let wrapper = wrapper_fragment_name("UserFriends", "first:Int=10,after:String");
        assert!(wrapper.starts_with("UserFriends_"));
        assert_eq!(wrapper.len(), "UserFriends_".len() + 8);
        assert_ne!(wrapper, wrapper_fragment_name("UserFriends", "first:Int=20,after:String"));
    }

    #[test]
    fn test_claims_converge_on_equal_content() {
        let registry = NameRegistry::seeded(["UserFriends"]);
        registry.claim("UserFriends_Pagination_Query", "abc").unwrap();
        registry.claim("UserFriends_Pagination_Query", "abc").unwrap();
        assert_eq!(registry.len(), 2);
        let error = registry
            .claim("UserFriends_Pagination_Query", "def")
            .unwrap_err();
        assert_eq!(error.code(), "name-collision");
    }

    #[test]
    fn test_authored_names_are_never_claimed() {
        let registry = NameRegistry::seeded(["Taken_Pagination_Query"]);
        assert!(registry.claim("Taken_Pagination_Query", "abc").is_err());
        registry.release("Taken_Pagination_Query");
        assert!(registry.contains("Taken_Pagination_Query"));
    }

    #[test]
    fn test_release_frees_generated_names() {
        let registry = NameRegistry::new();
        registry.claim("A_Pagination_Query", "abc").unwrap();
        registry.release("A_Pagination_Query");
        assert!(registry.is_empty());
        registry.claim("A_Pagination_Query", "def").unwrap();
    }

    #[test]
    fn test_concurrent_claims_converge() {
        let registry = NameRegistry::new();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| registry.claim("Shared_Pagination_Query", "same").unwrap());
            }
        });
        assert_eq!(registry.len(), 1);
    }
}

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::source::ObjectSourceType;

/// Raw bytes of one definition and where they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDefinition {
    pub source_type: ObjectSourceType,
    /// A concrete file path, URL or `-` for streams.
    pub resolved_source: String,
    pub definition: Vec<u8>,
}

/// Hex encoded SHA-256 of a payload.
pub fn definition_digest(definition: &[u8]) -> String {
    hex::encode(Sha256::digest(definition))
}

/// Definitions keyed by content digest; the first payload for a digest wins.
#[derive(Debug, Default)]
pub struct DefinitionSet {
    by_digest: HashMap<String, RawDefinition>,
}

impl DefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an identical payload was already stored.
    pub fn insert(&mut self, definition: RawDefinition) -> bool {
        let digest = definition_digest(&definition.definition);
        if self.by_digest.contains_key(&digest) {
            return false;
        }
        self.by_digest.insert(digest, definition);
        true
    }

    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }

    /// Ordered by source type, then resolved source.
    pub fn into_sorted(self) -> Vec<RawDefinition> {
        let mut defs: Vec<RawDefinition> = self.by_digest.into_values().collect();
        defs.sort_by(|a, b| {
            a.source_type
                .cmp(&b.source_type)
                .then_with(|| a.resolved_source.cmp(&b.resolved_source))
        });
        defs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(source_type: ObjectSourceType, path: &str, body: &str) -> RawDefinition {
        RawDefinition { source_type, resolved_source: path.into(), definition: body.as_bytes().to_vec() }
    }

    #[test]
    fn first_payload_wins() {
        let mut set = DefinitionSet::new();
        assert!(set.insert(def(ObjectSourceType::File, "/b.yaml", "same")));
        assert!(!set.insert(def(ObjectSourceType::File, "/a.yaml", "same")));
        assert_eq!(set.len(), 1);
        assert_eq!(set.into_sorted()[0].resolved_source, "/b.yaml");
    }

    #[test]
    fn distinct_payloads_sorted() {
        let mut set = DefinitionSet::new();
        set.insert(def(ObjectSourceType::Url, "https://x", "3"));
        set.insert(def(ObjectSourceType::File, "/z.yaml", "2"));
        set.insert(def(ObjectSourceType::File, "/a.yaml", "1"));
        let order: Vec<String> = set.into_sorted().into_iter().map(|d| d.resolved_source).collect();
        assert_eq!(order, ["/a.yaml", "/z.yaml", "https://x"]);
    }

    #[test]
    fn digest_is_sha256_hex() {
        assert_eq!(
            definition_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

use std::collections::BTreeMap;

use n9_core::{version, Kind, Object, ObjectFormat, ParseError};

/// Decodes one object document of a given kind for a single `apiVersion`.
pub type ParserFn = fn(&[u8], Kind, ObjectFormat) -> Result<Object, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("parser for version {0} already registered")]
    AlreadyRegistered(String),
}

/// Parsers keyed by `apiVersion`. Filled once at startup and shared read-only
/// afterwards (typically behind an `Arc`).
#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, ParserFn>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, version: &str, parser: ParserFn) -> Result<(), RegistryError> {
        if self.parsers.contains_key(version) {
            return Err(RegistryError::AlreadyRegistered(version.to_string()));
        }
        self.parsers.insert(version.to_string(), parser);
        Ok(())
    }

    pub fn get(&self, version: &str) -> Option<ParserFn> {
        self.parsers.get(version).copied()
    }

    pub fn versions(&self) -> Vec<String> {
        self.parsers.keys().cloned().collect()
    }
}

/// Registry with every built-in version.
pub fn standard() -> Result<ParserRegistry, RegistryError> {
    let mut registry = ParserRegistry::new();
    registry.register(version::V1ALPHA, n9_core::v1alpha::parse_object)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = standard().unwrap();
        assert_eq!(registry.versions(), ["n9/v1alpha"]);
        let err = registry.register("n9/v1alpha", n9_core::v1alpha::parse_object).unwrap_err();
        assert_eq!(err.to_string(), "parser for version n9/v1alpha already registered");
        assert!(registry.get("n9/v1beta").is_none());
    }
}

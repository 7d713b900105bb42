//! Cheap prefix and line heuristics routing a buffer to the right decoder.

use once_cell::sync::Lazy;
use regex::bytes::Regex;

static JSON_BUFFER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[?\s*\{").unwrap());
static JSON_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[").unwrap());
static YAML_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^- ").unwrap());

/// Shape of a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ident {
    Array,
    Object,
}

/// An object or an array of objects in JSON. Arrays of scalars are not
/// manifests and fall through to YAML.
pub fn is_json_buffer(buf: &[u8]) -> bool {
    JSON_BUFFER.is_match(buf)
}

pub fn json_ident(buf: &[u8]) -> Ident {
    if JSON_ARRAY.is_match(buf) {
        Ident::Array
    } else {
        Ident::Object
    }
}

/// Block sequences (`- ` at a line start) and flow sequences are arrays.
pub fn yaml_ident(buf: &[u8]) -> Ident {
    if YAML_ARRAY.is_match(buf) || JSON_ARRAY.is_match(buf) {
        Ident::Array
    } else {
        Ident::Object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_detection() {
        assert!(is_json_buffer(b"{\"a\":1}"));
        assert!(is_json_buffer(b"  \n [ \n {\"a\":1}]"));
        assert!(!is_json_buffer(b"[\"a\", \"b\"]"));
        assert!(!is_json_buffer(b"apiVersion: n9/v1alpha"));
        assert_eq!(json_ident(b" [{}]"), Ident::Array);
        assert_eq!(json_ident(b"{}"), Ident::Object);
    }

    #[test]
    fn yaml_detection() {
        assert_eq!(yaml_ident(b"- name: a\n- name: b\n"), Ident::Array);
        assert_eq!(yaml_ident(b"# list\n- name: a\n"), Ident::Array);
        assert_eq!(yaml_ident(b"[a, b]"), Ident::Array);
        assert_eq!(yaml_ident(b"kind: Project\nmetadata:\n  name: a\n"), Ident::Object);
        assert_eq!(yaml_ident(b"spec:\n  items:\n    - a\n"), Ident::Object);
    }
}

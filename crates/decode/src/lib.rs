//! n9 manifest decoding: format sniffing, YAML document splitting and
//! dispatch of each document to the parser registered for its `apiVersion`.

#![forbid(unsafe_code)]

mod decoder;
pub mod registry;
pub mod sniff;
pub mod split;

pub use decoder::{annotate_with_manifest_source, DecodeError, Decoder};
pub use registry::{standard, ParserFn, ParserRegistry, RegistryError};
pub use sniff::{is_json_buffer, json_ident, yaml_ident, Ident};
pub use split::{split_yaml_documents, YamlDocuments};

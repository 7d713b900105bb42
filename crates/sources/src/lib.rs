//! n9 manifest sources: resolving files, directories, globs, URLs and streams
//! into raw definitions, deduplicating them by content and decoding them into
//! objects.
#![forbid(unsafe_code)]

mod config;
pub mod dedup;
mod error;
mod fetch;
mod reader;
mod source;

pub use config::ReaderConfig;
pub use dedup::{definition_digest, DefinitionSet, RawDefinition};
pub use error::SourceError;
pub use fetch::{FetchError, HttpFetcher, HttpResponse, ReqwestFetcher};
pub use reader::{filter_raw_definitions, ObjectsReader, SourceReader, API_VERSION_REGEX};
pub use source::{
    clean_path, resolve_object_source, resolve_object_sources, ObjectSource, ObjectSourceType, SUPPORTED_EXTENSIONS,
};

use std::time::Duration;

use n9_decode::DecodeError;

use crate::fetch::FetchError;
use crate::reader::API_VERSION_REGEX;
use crate::source::SUPPORTED_EXTENSIONS;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid ObjectSourceType provided: {0}")]
    InvalidSourceType(String),
    #[error("Reader source may define at most a single path")]
    SourceTypeReaderPath,
    #[error("Reader source has no input stream")]
    IoReaderIsNil,
    #[error(
        "no n9 manifest files matched the pattern '{pattern}', valid files have one of the extensions: [{}]",
        SUPPORTED_EXTENSIONS.join(",")
    )]
    NoFilesMatchingPattern { pattern: String },
    #[error(
        "no n9 manifest files were found under '{path}', valid files have one of the extensions: [{}]",
        SUPPORTED_EXTENSIONS.join(",")
    )]
    NoFilesInPath { path: String },
    #[error("{path}: valid n9 manifest must match against the following regex: '{}'", API_VERSION_REGEX)]
    InvalidFile { path: String },
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern { pattern: String, source: glob::PatternError },
    #[error("failed to resolve '{path}': {source}")]
    Resolve { path: String, source: std::io::Error },
    #[error("failed to read resource definitions from '{origin}': {source}")]
    Io { origin: String, source: std::io::Error },
    #[error("failed to read resource definitions from '{origin}': {source}")]
    Fetch { origin: String, source: FetchError },
    #[error("GET {url} response: {status} {body}")]
    HttpStatus { url: String, status: u16, body: String },
    #[error("GET {url} did not complete within {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("definition read from '{path}' has {size} bytes, above the limit of {limit}")]
    DefinitionTooLarge { path: String, size: usize, limit: usize },
    #[error("{path}: {source}")]
    Decode { path: String, source: DecodeError },
}

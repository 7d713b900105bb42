use std::fs::File;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use n9_core::Object;
use n9_decode::{annotate_with_manifest_source, Decoder};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::{debug, info};

use crate::config::ReaderConfig;
use crate::dedup::{DefinitionSet, RawDefinition};
use crate::error::SourceError;
use crate::fetch::{FetchError, HttpFetcher, ReqwestFetcher};
use crate::source::{resolve_object_sources, ObjectSource, ObjectSourceType};

/// Marker every file or URL definition has to contain.
pub const API_VERSION_REGEX: &str = r#""?apiVersion"?\s*:\s*"?n9"#;

static API_VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(API_VERSION_REGEX).unwrap());

const STDIN_PATH: &str = "-";

/// Alternative entry point for turning resolved sources into objects.
#[async_trait]
pub trait ObjectsReader: Send + Sync {
    async fn read(&self, sources: Vec<ObjectSource>) -> Result<Vec<Object>, SourceError>;
}

/// Reads, deduplicates and decodes the definitions behind a set of sources.
#[derive(Clone)]
pub struct SourceReader {
    decoder: Decoder,
    fetcher: Arc<dyn HttpFetcher>,
    config: ReaderConfig,
}

impl std::fmt::Debug for SourceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceReader").field("decoder", &self.decoder).field("config", &self.config).finish()
    }
}

impl SourceReader {
    /// Reader fetching URLs over `reqwest`.
    pub fn new(decoder: Decoder, config: ReaderConfig) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(config.http_timeout, config.max_definition_bytes)?);
        Ok(Self { decoder, fetcher, config })
    }

    pub fn with_fetcher(decoder: Decoder, fetcher: Arc<dyn HttpFetcher>, config: ReaderConfig) -> Self {
        Self { decoder, fetcher, config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Resolves `raws` and reads every object behind them.
    pub async fn read_objects<S: AsRef<str>>(&self, raws: &[S]) -> Result<Vec<Object>, SourceError> {
        let sources = resolve_object_sources(raws)?;
        self.read_objects_from_sources(sources).await
    }

    pub async fn read_objects_from_sources(&self, sources: Vec<ObjectSource>) -> Result<Vec<Object>, SourceError> {
        let started = Instant::now();
        let definitions = filter_raw_definitions(self.read_raw_definitions(sources).await?)?;
        let mut objects = Vec::new();
        for def in definitions {
            let decoded = self
                .decoder
                .decode_objects(&def.definition)
                .map_err(|source| SourceError::Decode { path: def.resolved_source.clone(), source })?;
            debug!(source = %def.resolved_source, count = decoded.len(), "decoded definition");
            objects.extend(decoded.into_iter().map(|o| annotate_with_manifest_source(o, &def.resolved_source)));
        }
        histogram!("read_objects_ms", started.elapsed().as_secs_f64() * 1000.0);
        Ok(objects)
    }

    /// Raw payloads of every source, one per distinct content, ordered by
    /// source type then path.
    pub async fn read_raw_definitions(&self, mut sources: Vec<ObjectSource>) -> Result<Vec<RawDefinition>, SourceError> {
        sources.sort_by(|a, b| b.raw.cmp(&a.raw));
        let mut set = DefinitionSet::new();
        for source in sources {
            for def in self.read_source(source).await? {
                let resolved = def.resolved_source.clone();
                if set.insert(def) {
                    counter!("definitions_read_total", 1u64);
                } else {
                    counter!("definitions_duplicate_total", 1u64);
                    debug!(source = %resolved, "dropping duplicate definition");
                }
            }
        }
        Ok(set.into_sorted())
    }

    async fn read_source(&self, source: ObjectSource) -> Result<Vec<RawDefinition>, SourceError> {
        let ObjectSource { source_type, paths, reader, raw } = source;
        debug!(raw = %raw, source_type = %source_type, "reading object source");
        match source_type {
            ObjectSourceType::Reader => {
                let path = match paths.len() {
                    0 => STDIN_PATH.to_string(),
                    1 => paths.into_iter().next().unwrap_or_default(),
                    _ => return Err(SourceError::SourceTypeReaderPath),
                };
                let reader = reader.ok_or(SourceError::IoReaderIsNil)?;
                let definition = self.read_stream(reader, &path).await?;
                Ok(vec![RawDefinition { source_type, resolved_source: path, definition }])
            }
            ObjectSourceType::Url => {
                let mut defs = Vec::with_capacity(paths.len());
                for url in paths {
                    let definition = self.fetch(&url).await?;
                    defs.push(RawDefinition { source_type, resolved_source: url, definition });
                }
                Ok(defs)
            }
            ObjectSourceType::File | ObjectSourceType::Directory | ObjectSourceType::GlobPattern => {
                let mut defs = Vec::with_capacity(paths.len());
                for path in paths {
                    let definition = self.read_file(&path)?;
                    defs.push(RawDefinition { source_type, resolved_source: path, definition });
                }
                Ok(defs)
            }
        }
    }

    /// Reads a stream off the runtime threads, at most one byte past the limit.
    async fn read_stream(&self, reader: Box<dyn Read + Send>, path: &str) -> Result<Vec<u8>, SourceError> {
        let cap = self.config.max_definition_bytes as u64 + 1;
        let io_err = |source| SourceError::Io { origin: path.to_string(), source };
        let definition = tokio::task::spawn_blocking(move || {
            let mut definition = Vec::new();
            reader.take(cap).read_to_end(&mut definition).map(|_| definition)
        })
        .await
        .map_err(|e| io_err(io::Error::new(io::ErrorKind::Other, e)))?
        .map_err(io_err)?;
        self.check_size(path, definition.len())?;
        Ok(definition)
    }

    /// Rejects oversized files by their metadata before reading them.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let io_err = |source| SourceError::Io { origin: path.to_string(), source };
        let file = File::open(path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();
        self.check_size(path, usize::try_from(size).unwrap_or(usize::MAX))?;
        let mut definition = Vec::with_capacity(size as usize);
        file.take(self.config.max_definition_bytes as u64 + 1)
            .read_to_end(&mut definition)
            .map_err(io_err)?;
        self.check_size(path, definition.len())?;
        Ok(definition)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let timeout = self.config.http_timeout;
        let started = Instant::now();
        let resp = tokio::time::timeout(timeout, self.fetcher.get(url))
            .await
            .map_err(|_| SourceError::Timeout { url: url.to_string(), timeout })?
            .map_err(|source| SourceError::Fetch { origin: url.to_string(), source })?;
        counter!("url_fetch_total", 1u64);
        info!(
            url,
            status = resp.status,
            bytes = resp.body.len(),
            took_ms = started.elapsed().as_millis() as u64,
            "fetched definition"
        );
        if resp.status != 200 {
            return Err(SourceError::HttpStatus {
                url: url.to_string(),
                status: resp.status,
                body: String::from_utf8_lossy(&resp.body).into_owned(),
            });
        }
        self.check_size(url, resp.body.len())?;
        Ok(resp.body)
    }

    fn check_size(&self, path: &str, size: usize) -> Result<(), SourceError> {
        let limit = self.config.max_definition_bytes;
        if size > limit {
            return Err(SourceError::DefinitionTooLarge { path: path.to_string(), size, limit });
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectsReader for SourceReader {
    async fn read(&self, sources: Vec<ObjectSource>) -> Result<Vec<Object>, SourceError> {
        self.read_objects_from_sources(sources).await
    }
}

/// Drops definitions that do not look like n9 manifests. Explicit files and
/// URLs without the marker are an error; files found by directory scans or
/// globs are skipped.
pub fn filter_raw_definitions(definitions: Vec<RawDefinition>) -> Result<Vec<RawDefinition>, SourceError> {
    let mut kept = Vec::with_capacity(definitions.len());
    for def in definitions {
        if def.source_type == ObjectSourceType::Reader || API_VERSION_RE.is_match(&def.definition) {
            kept.push(def);
            continue;
        }
        match def.source_type {
            ObjectSourceType::File | ObjectSourceType::Url => {
                return Err(SourceError::InvalidFile { path: def.resolved_source });
            }
            _ => {
                counter!("definitions_skipped_total", 1u64);
                debug!(source = %def.resolved_source, "skipping file without n9 apiVersion");
            }
        }
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(source_type: ObjectSourceType, path: &str, body: &str) -> RawDefinition {
        RawDefinition { source_type, resolved_source: path.into(), definition: body.as_bytes().to_vec() }
    }

    #[test]
    fn marker_regex() {
        assert!(API_VERSION_RE.is_match(b"apiVersion: n9/v1alpha"));
        assert!(API_VERSION_RE.is_match(br#"{"apiVersion": "n9/v1alpha"}"#));
        assert!(!API_VERSION_RE.is_match(b"apiVersion: v1"));
    }

    #[test]
    fn filter_by_source_type() {
        let kept = filter_raw_definitions(vec![
            def(ObjectSourceType::Directory, "/d/readme.yaml", "title: notes"),
            def(ObjectSourceType::GlobPattern, "/d/a.yaml", "apiVersion: n9/v1alpha"),
            def(ObjectSourceType::Reader, "-", "anything"),
        ])
        .unwrap();
        let paths: Vec<&str> = kept.iter().map(|d| d.resolved_source.as_str()).collect();
        assert_eq!(paths, ["/d/a.yaml", "-"]);

        let err = filter_raw_definitions(vec![def(ObjectSourceType::Url, "https://x/a", "<html>")]).unwrap_err();
        assert!(matches!(err, SourceError::InvalidFile { path } if path == "https://x/a"));
    }
}

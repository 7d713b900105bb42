use std::fmt;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::SourceError;

pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".yaml", ".yml", ".json"];

/// How an [`ObjectSource`] is read. Ordering follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectSourceType {
    File,
    Directory,
    GlobPattern,
    Url,
    Reader,
}

impl ObjectSourceType {
    pub const ALL: [ObjectSourceType; 5] = [
        ObjectSourceType::File,
        ObjectSourceType::Directory,
        ObjectSourceType::GlobPattern,
        ObjectSourceType::Url,
        ObjectSourceType::Reader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectSourceType::File => "File",
            ObjectSourceType::Directory => "Directory",
            ObjectSourceType::GlobPattern => "GlobPattern",
            ObjectSourceType::Url => "URL",
            ObjectSourceType::Reader => "Reader",
        }
    }
}

impl fmt::Display for ObjectSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectSourceType {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SourceError::InvalidSourceType(s.to_string()))
    }
}

/// A resolved source. Consumed once by [`crate::SourceReader`].
pub struct ObjectSource {
    pub source_type: ObjectSourceType,
    /// Concrete paths or URLs to read.
    pub paths: Vec<String>,
    /// Stream of a `Reader` source.
    pub reader: Option<Box<dyn Read + Send>>,
    /// The source as given by the caller.
    pub raw: String,
}

impl fmt::Debug for ObjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSource")
            .field("source_type", &self.source_type)
            .field("paths", &self.paths)
            .field("reader", &self.reader.is_some())
            .field("raw", &self.raw)
            .finish()
    }
}

impl fmt::Display for ObjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ObjectSourceType: {}, Raw: {}}}", self.source_type, self.raw)
    }
}

impl ObjectSource {
    /// A `Reader` source over `reader`, such as standard input.
    pub fn reader(reader: impl Read + Send + 'static, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let paths = if raw.is_empty() { Vec::new() } else { vec![raw.clone()] };
        Self { source_type: ObjectSourceType::Reader, paths, reader: Some(Box::new(reader)), raw }
    }
}

fn has_url_schema(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

fn has_glob_meta(raw: &str) -> bool {
    let magic: &[char] = if cfg!(windows) { &['*', '?', '['] } else { &['*', '?', '[', '\\'] };
    raw.contains(magic)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| SUPPORTED_EXTENSIONS.iter().any(|s| s[1..] == *e))
}

/// Lexically normalised absolute form of `raw`, relative to the working
/// directory.
pub fn clean_path(raw: &str) -> Result<PathBuf, SourceError> {
    let path = Path::new(raw);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| SourceError::Resolve { path: raw.to_string(), source })?
            .join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn resolve_glob_pattern(raw: &str) -> Result<Vec<String>, SourceError> {
    let pattern = path_string(&clean_path(raw)?);
    let entries =
        glob::glob(&pattern).map_err(|source| SourceError::Pattern { pattern: raw.to_string(), source })?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SourceError::Resolve { path: path_string(e.path()), source: e.into_error() })?;
        if path.is_file() && has_supported_extension(&path) {
            paths.push(path_string(&path));
        }
    }
    if paths.is_empty() {
        return Err(SourceError::NoFilesMatchingPattern { pattern: raw.to_string() });
    }
    Ok(paths)
}

fn resolve_fs_path(raw: &str) -> Result<(ObjectSourceType, Vec<String>), SourceError> {
    let path = clean_path(raw)?;
    let meta = std::fs::metadata(&path).map_err(|source| SourceError::Resolve { path: path_string(&path), source })?;
    if !meta.is_dir() {
        return Ok((ObjectSourceType::File, vec![path_string(&path)]));
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(&path).sort_by_file_name() {
        let entry = entry.map_err(|e| SourceError::Resolve {
            path: e.path().map(path_string).unwrap_or_else(|| path_string(&path)),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && has_supported_extension(entry.path()) {
            paths.push(path_string(entry.path()));
        }
    }
    if paths.is_empty() {
        return Err(SourceError::NoFilesInPath { path: path_string(&path) });
    }
    Ok((ObjectSourceType::Directory, paths))
}

/// Classifies `raw` as a URL, glob pattern, directory or file and resolves
/// the concrete paths it points at.
pub fn resolve_object_source(raw: &str) -> Result<ObjectSource, SourceError> {
    let (source_type, paths) = if has_url_schema(raw) {
        (ObjectSourceType::Url, vec![raw.to_string()])
    } else if has_glob_meta(raw) {
        (ObjectSourceType::GlobPattern, resolve_glob_pattern(raw)?)
    } else {
        resolve_fs_path(raw)?
    };
    debug!(raw, source_type = %source_type, count = paths.len(), "resolved object source");
    Ok(ObjectSource { source_type, paths, reader: None, raw: raw.to_string() })
}

/// Resolves every source, stopping at the first failure.
pub fn resolve_object_sources<S: AsRef<str>>(raws: &[S]) -> Result<Vec<ObjectSource>, SourceError> {
    raws.iter().map(|raw| resolve_object_source(raw.as_ref())).collect()
}

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use n9_core::{Kind, Manifest, Object, ObjectFormat, ParseError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::debug;

use crate::registry::ParserRegistry;
use crate::sniff::{is_json_buffer, json_ident, yaml_ident, Ident};
use crate::split::split_yaml_documents;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no definitions in input")]
    NoDefinitionsFound,
    #[error("unsupported apiVersion '{version}', supported versions: [{}]", .supported.join(", "))]
    InvalidVersion { version: String, supported: Vec<String> },
    #[error("unexpected number of objects: {0}, expected exactly one")]
    UnexpectedObjectCount(usize),
    #[error("object of kind {found} is not of type {expected}")]
    UnexpectedObjectType { found: Kind, expected: &'static str },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Just enough of a document to pick its parser. Unknown fields are ignored
/// and an unrecognised kind becomes `Kind::Unknown`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "apiVersion", default)]
    api_version: String,
    #[serde(default)]
    kind: Kind,
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Turns raw JSON or YAML into typed objects using the parsers of a
/// [`ParserRegistry`].
#[derive(Debug, Clone)]
pub struct Decoder {
    registry: Arc<ParserRegistry>,
}

impl Decoder {
    pub fn new(registry: Arc<ParserRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Every object in `data`; empty input is an error.
    pub fn decode_objects(&self, data: &[u8]) -> Result<Vec<Object>, DecodeError> {
        let started = Instant::now();
        let objects = if is_json_buffer(data) { self.decode_json(data) } else { self.decode_yaml(data) }?;
        histogram!("decode_ms", started.elapsed().as_secs_f64() * 1000.0);
        if objects.is_empty() {
            return Err(DecodeError::NoDefinitionsFound);
        }
        counter!("objects_decoded_total", objects.len() as u64);
        Ok(objects)
    }

    /// Exactly one object.
    pub fn decode_object(&self, data: &[u8]) -> Result<Object, DecodeError> {
        let mut objects = self.decode_objects(data)?;
        if objects.len() != 1 {
            return Err(DecodeError::UnexpectedObjectCount(objects.len()));
        }
        Ok(objects.remove(0))
    }

    /// Exactly one object of the concrete type `T`.
    pub fn decode_object_as<T>(&self, data: &[u8]) -> Result<T, DecodeError>
    where
        T: TryFrom<Object, Error = Object>,
    {
        let object = self.decode_object(data)?;
        T::try_from(object).map_err(|other| DecodeError::UnexpectedObjectType {
            found: other.kind(),
            expected: short_type_name::<T>(),
        })
    }

    /// Same routing as [`Decoder::decode_objects`] but into any serde type,
    /// without consulting the registry.
    pub fn decode_generic<T: DeserializeOwned>(&self, data: &[u8]) -> Result<Vec<T>, DecodeError> {
        let mut out = Vec::new();
        if is_json_buffer(data) {
            match json_ident(data) {
                Ident::Array => out = serde_json::from_slice(data)?,
                Ident::Object => out.push(serde_json::from_slice(data)?),
            }
        } else {
            for doc in split_yaml_documents(data) {
                match yaml_ident(doc) {
                    Ident::Array => out.extend(serde_yaml::from_slice::<Vec<T>>(doc)?),
                    Ident::Object => out.push(serde_yaml::from_slice(doc)?),
                }
            }
        }
        if out.is_empty() {
            return Err(DecodeError::NoDefinitionsFound);
        }
        Ok(out)
    }

    fn decode_json(&self, data: &[u8]) -> Result<Vec<Object>, DecodeError> {
        match json_ident(data) {
            Ident::Array => {
                let items: Vec<Box<RawValue>> = serde_json::from_slice(data)?;
                items
                    .iter()
                    .map(|raw| self.decode_document(raw.get().as_bytes(), ObjectFormat::Json))
                    .collect()
            }
            Ident::Object => Ok(vec![self.decode_document(data, ObjectFormat::Json)?]),
        }
    }

    fn decode_yaml(&self, data: &[u8]) -> Result<Vec<Object>, DecodeError> {
        let mut objects = Vec::new();
        for (i, doc) in split_yaml_documents(data).enumerate() {
            match yaml_ident(doc) {
                Ident::Array => {
                    let items: Vec<serde_yaml::Value> = serde_yaml::from_slice(doc)?;
                    debug!(document = i, count = items.len(), "decoding yaml sequence");
                    for item in items {
                        let encoded = serde_yaml::to_string(&item)?;
                        objects.push(self.decode_document(encoded.as_bytes(), ObjectFormat::Yaml)?);
                    }
                }
                Ident::Object => objects.push(self.decode_document(doc, ObjectFormat::Yaml)?),
            }
        }
        Ok(objects)
    }

    fn decode_document(&self, doc: &[u8], format: ObjectFormat) -> Result<Object, DecodeError> {
        let envelope: Envelope = match format {
            ObjectFormat::Json => serde_json::from_slice(doc)?,
            ObjectFormat::Yaml => serde_yaml::from_slice(doc)?,
        };
        let Some(parser) = self.registry.get(&envelope.api_version) else {
            return Err(DecodeError::InvalidVersion {
                version: envelope.api_version,
                supported: self.registry.versions(),
            });
        };
        Ok(parser(doc, envelope.kind, format)?)
    }
}

/// Records where `object` came from unless it already carries a source.
pub fn annotate_with_manifest_source(object: Object, source: &str) -> Object {
    if object.manifest_source().is_empty() && !source.is_empty() {
        object.with_manifest_source(source)
    } else {
        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::standard;
    use n9_core::v1alpha::{Project, Service};

    fn decoder() -> Decoder {
        Decoder::new(Arc::new(standard().unwrap()))
    }

    #[test]
    fn json_object_and_array() {
        let one = decoder()
            .decode_objects(br#"{"apiVersion":"n9/v1alpha","kind":"Project","metadata":{"name":"x"}}"#)
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].name(), "x");

        let many = decoder()
            .decode_objects(
                br#"[
                  {"apiVersion":"n9/v1alpha","kind":"Project","metadata":{"name":"a"}},
                  {"apiVersion":"n9/v1alpha","kind":"Service","metadata":{"name":"b","project":"a"}}
                ]"#,
            )
            .unwrap();
        let kinds: Vec<Kind> = many.iter().map(|o| o.kind()).collect();
        assert_eq!(kinds, [Kind::Project, Kind::Service]);
    }

    #[test]
    fn yaml_mixes_sequences_and_objects() {
        let yaml = b"- apiVersion: n9/v1alpha\n  kind: Project\n  metadata:\n    name: a\n\
- apiVersion: n9/v1alpha\n  kind: Project\n  metadata:\n    name: b\n\
---\n\
apiVersion: n9/v1alpha\nkind: Service\nmetadata:\n  name: c\n  project: a\n";
        let names: Vec<String> = decoder().decode_objects(yaml).unwrap().iter().map(|o| o.name().to_string()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn unknown_version() {
        let err = decoder().decode_objects(b"apiVersion: n9/v2\nkind: Project\n").unwrap_err();
        assert!(matches!(&err, DecodeError::InvalidVersion { version, .. } if version == "n9/v2"));
        assert_eq!(err.to_string(), "unsupported apiVersion 'n9/v2', supported versions: [n9/v1alpha]");
    }

    #[test]
    fn unknown_kind_reaches_the_parser() {
        let err = decoder().decode_objects(b"apiVersion: n9/v1alpha\nkind: Dashboard\n").unwrap_err();
        assert!(matches!(err, DecodeError::Parse(ParseError::InvalidKind)));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(decoder().decode_objects(b"\n---\n").unwrap_err(), DecodeError::NoDefinitionsFound));
        assert!(matches!(decoder().decode_objects(b"[]").unwrap_err(), DecodeError::NoDefinitionsFound));
    }

    #[test]
    fn exactly_one() {
        let two = b"apiVersion: n9/v1alpha\nkind: Project\nmetadata:\n  name: a\n---\n\
apiVersion: n9/v1alpha\nkind: Project\nmetadata:\n  name: b\n";
        let err = decoder().decode_object(two).unwrap_err();
        assert_eq!(err.to_string(), "unexpected number of objects: 2, expected exactly one");
        assert!(matches!(decoder().decode_object(b"\n---\n").unwrap_err(), DecodeError::NoDefinitionsFound));

        let one = b"apiVersion: n9/v1alpha\nkind: Project\nmetadata:\n  name: a\n";
        let project: Project = decoder().decode_object_as(one).unwrap();
        assert_eq!(project.metadata.name, "a");
        let err = decoder().decode_object_as::<Service>(one).unwrap_err();
        assert_eq!(err.to_string(), "object of kind Project is not of type Service");
    }

    #[test]
    fn annotation_is_idempotent() {
        let obj = decoder().decode_object(b"apiVersion: n9/v1alpha\nkind: Project\nmetadata:\n  name: a\n").unwrap();
        let obj = annotate_with_manifest_source(obj, "/a.yaml");
        let obj = annotate_with_manifest_source(obj, "/b.yaml");
        assert_eq!(obj.manifest_source(), "/a.yaml");
    }
}

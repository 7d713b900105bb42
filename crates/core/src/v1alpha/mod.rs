//! `n9/v1alpha` objects, their validation and the version parser.

use n9_validation::{plan, PropertyPlan};
use serde::de::DeserializeOwned;

use crate::kind::Kind;
use crate::object::{Object, ObjectFormat, ParseError};

/// `Manifest` for a kind whose struct has `header` and `metadata.name`.
macro_rules! impl_manifest {
    ($ty:ident, $validator:expr) => {
        impl $crate::object::Manifest for $ty {
            fn header(&self) -> &$crate::object::ObjectHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut $crate::object::ObjectHeader {
                &mut self.header
            }

            fn name(&self) -> &str {
                &self.metadata.name
            }

            fn validate(&self) -> Result<(), $crate::errors::ObjectError> {
                $crate::errors::validate_object(&*$validator, self)
            }
        }
    };
    ($ty:ident, $validator:expr, project_scoped) => {
        impl $crate::object::Manifest for $ty {
            fn header(&self) -> &$crate::object::ObjectHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut $crate::object::ObjectHeader {
                &mut self.header
            }

            fn name(&self) -> &str {
                &self.metadata.name
            }

            fn project(&self) -> Option<&str> {
                Some(&self.metadata.project)
            }

            fn validate(&self) -> Result<(), $crate::errors::ObjectError> {
                $crate::errors::validate_object(&*$validator, self)
            }
        }

        impl $crate::object::ProjectScoped for $ty {
            fn with_project(mut self, project: impl Into<String>) -> Self {
                self.metadata.project = project.into();
                self
            }
        }
    };
}

pub mod agent;
pub mod alert_method;
pub mod alert_policy;
mod metadata;
pub mod project;
pub mod service;
pub mod slo;

pub use agent::Agent;
pub use alert_method::AlertMethod;
pub use alert_policy::AlertPolicy;
pub use metadata::{Labels, Metadata, ProjectMetadata};
pub use project::Project;
pub use service::Service;
pub use slo::Slo;

fn decode<T: DeserializeOwned>(data: &[u8], kind: Kind, format: ObjectFormat) -> Result<T, ParseError> {
    match format {
        ObjectFormat::Json => serde_json::from_slice(data).map_err(|source| ParseError::Json { kind, source }),
        ObjectFormat::Yaml => serde_yaml::from_slice(data).map_err(|source| ParseError::Yaml { kind, source }),
    }
}

/// Parser registered for `n9/v1alpha`: decodes one object document of `kind`.
pub fn parse_object(data: &[u8], kind: Kind, format: ObjectFormat) -> Result<Object, ParseError> {
    Ok(match kind {
        Kind::Project => Object::Project(decode(data, kind, format)?),
        Kind::Service => Object::Service(decode(data, kind, format)?),
        Kind::Slo => Object::Slo(decode(data, kind, format)?),
        Kind::Agent => Object::Agent(decode(data, kind, format)?),
        Kind::AlertPolicy => Object::AlertPolicy(decode(data, kind, format)?),
        Kind::AlertMethod => Object::AlertMethod(decode(data, kind, format)?),
        Kind::Unknown => return Err(ParseError::InvalidKind),
    })
}

/// Validation plan of a kind, `None` for `Kind::Unknown`.
pub fn plan_for(kind: Kind) -> Option<Vec<PropertyPlan>> {
    Some(match kind {
        Kind::Project => plan(&*project::VALIDATOR),
        Kind::Service => plan(&*service::VALIDATOR),
        Kind::Slo => plan(&*slo::VALIDATOR),
        Kind::Agent => plan(&*agent::VALIDATOR),
        Kind::AlertPolicy => plan(&*alert_policy::VALIDATOR),
        Kind::AlertMethod => plan(&*alert_method::VALIDATOR),
        Kind::Unknown => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Manifest;

    #[test]
    fn parses_by_kind() {
        let yaml = b"apiVersion: n9/v1alpha\nkind: Project\nmetadata:\n  name: default\n";
        let obj = parse_object(yaml, Kind::Project, ObjectFormat::Yaml).unwrap();
        assert_eq!(obj.kind(), Kind::Project);
        assert_eq!(obj.name(), "default");

        let json = br#"{"apiVersion":"n9/v1alpha","kind":"Service","metadata":{"name":"api","project":"default"}}"#;
        let obj = parse_object(json, Kind::Service, ObjectFormat::Json).unwrap();
        assert_eq!(obj.project(), Some("default"));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = parse_object(b"{}", Kind::Unknown, ObjectFormat::Json).unwrap_err();
        assert!(matches!(err, ParseError::InvalidKind));
    }

    #[test]
    fn malformed_body_names_the_kind() {
        let err = parse_object(br#"{"metadata": 5}"#, Kind::Agent, ObjectFormat::Json).unwrap_err();
        assert!(err.to_string().starts_with("failed to decode Agent object"));
    }

    #[test]
    fn every_kind_has_a_plan() {
        for kind in Kind::ALL {
            let plans = plan_for(kind).unwrap();
            assert!(plans.iter().any(|p| p.path == "$.metadata.name"), "{kind}");
        }
        assert!(plan_for(Kind::Unknown).is_none());
    }
}

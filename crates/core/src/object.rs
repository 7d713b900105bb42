use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ObjectError;
use crate::kind::Kind;
use crate::v1alpha::{Agent, AlertMethod, AlertPolicy, Project, Service, Slo};

/// Fields shared by every object, embedded with `#[serde(flatten)]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectHeader {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "Kind::is_unknown")]
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization: String,
    #[serde(rename = "manifestSrc", default, skip_serializing_if = "String::is_empty")]
    pub manifest_source: String,
}

impl ObjectHeader {
    pub fn new(api_version: &str, kind: Kind) -> Self {
        Self { api_version: api_version.to_string(), kind, ..Self::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectFormat {
    Json,
    Yaml,
}

impl fmt::Display for ObjectFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectFormat::Json => "JSON",
            ObjectFormat::Yaml => "YAML",
        })
    }
}

/// Failure of a version parser on one object document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("kind is missing or not a valid Kind, try [{}]", Kind::names().join(", "))]
    InvalidKind,
    #[error("failed to decode {kind} object: {source}")]
    Json { kind: Kind, source: serde_json::Error },
    #[error("failed to decode {kind} object: {source}")]
    Yaml { kind: Kind, source: serde_yaml::Error },
}

/// Behaviour common to every top-level object.
pub trait Manifest {
    fn header(&self) -> &ObjectHeader;

    fn header_mut(&mut self) -> &mut ObjectHeader;

    fn name(&self) -> &str;

    /// Project for project-scoped kinds.
    fn project(&self) -> Option<&str> {
        None
    }

    fn validate(&self) -> Result<(), ObjectError>;

    fn api_version(&self) -> &str {
        &self.header().api_version
    }

    fn kind(&self) -> Kind {
        self.header().kind
    }

    fn organization(&self) -> &str {
        &self.header().organization
    }

    fn manifest_source(&self) -> &str {
        &self.header().manifest_source
    }

    fn with_manifest_source(mut self, source: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.header_mut().manifest_source = source.into();
        self
    }

    fn with_organization(mut self, organization: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.header_mut().organization = organization.into();
        self
    }
}

/// Objects that live inside a project.
pub trait ProjectScoped: Manifest {
    fn with_project(self, project: impl Into<String>) -> Self
    where
        Self: Sized;
}

/// Any decoded object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Object {
    Project(Project),
    Service(Service),
    Slo(Slo),
    Agent(Agent),
    AlertPolicy(AlertPolicy),
    AlertMethod(AlertMethod),
}

macro_rules! each_object {
    ($self:expr, $o:ident => $body:expr) => {
        match $self {
            Object::Project($o) => $body,
            Object::Service($o) => $body,
            Object::Slo($o) => $body,
            Object::Agent($o) => $body,
            Object::AlertPolicy($o) => $body,
            Object::AlertMethod($o) => $body,
        }
    };
}

impl Manifest for Object {
    fn header(&self) -> &ObjectHeader {
        each_object!(self, o => o.header())
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        each_object!(self, o => o.header_mut())
    }

    fn name(&self) -> &str {
        each_object!(self, o => o.name())
    }

    fn project(&self) -> Option<&str> {
        each_object!(self, o => o.project())
    }

    fn validate(&self) -> Result<(), ObjectError> {
        each_object!(self, o => o.validate())
    }
}

impl Object {
    /// Sets the project of project-scoped objects; a `Project` is returned
    /// unchanged.
    pub fn with_project(self, project: impl Into<String>) -> Self {
        match self {
            Object::Project(o) => Object::Project(o),
            Object::Service(o) => Object::Service(o.with_project(project)),
            Object::Slo(o) => Object::Slo(o.with_project(project)),
            Object::Agent(o) => Object::Agent(o.with_project(project)),
            Object::AlertPolicy(o) => Object::AlertPolicy(o.with_project(project)),
            Object::AlertMethod(o) => Object::AlertMethod(o.with_project(project)),
        }
    }

    pub fn is_project_scoped(&self) -> bool {
        !matches!(self, Object::Project(_))
    }
}

macro_rules! object_conversions {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Object {
                fn from(o: $variant) -> Self {
                    Object::$variant(o)
                }
            }

            /// Hands the object back when it is of another kind.
            impl TryFrom<Object> for $variant {
                type Error = Object;

                fn try_from(o: Object) -> Result<Self, Self::Error> {
                    match o {
                        Object::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

object_conversions!(Project, Service, Slo, Agent, AlertPolicy, AlertMethod);

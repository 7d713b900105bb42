use std::fmt;

use n9_validation::{join_errors, HasErrorCode, PropertyError, Validator};
use serde::{Deserialize, Serialize};

use crate::kind::Kind;
use crate::object::{Manifest, Object};

/// Identity of the object an [`ObjectError`] refers to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    #[serde(default)]
    pub kind: Kind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub is_project_scoped: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
}

impl ObjectMetadata {
    pub fn of<M: Manifest + ?Sized>(object: &M) -> Self {
        Self {
            kind: object.kind(),
            name: object.name().to_string(),
            source: object.manifest_source().to_string(),
            is_project_scoped: object.project().is_some(),
            project: object.project().unwrap_or_default().to_string(),
        }
    }
}

/// One entry of [`ObjectError::errors`]: a structured property failure or a
/// plain message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldFailure {
    Property(PropertyError),
    Message(String),
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFailure::Property(p) => p.fmt(f),
            FieldFailure::Message(m) => f.write_str(m),
        }
    }
}

/// Validation failure of a single object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectError {
    pub object: ObjectMetadata,
    pub errors: Vec<FieldFailure>,
}

impl ObjectError {
    pub fn new(object: ObjectMetadata, errors: Vec<FieldFailure>) -> Self {
        Self { object, errors }
    }

    pub fn from_properties(object: ObjectMetadata, errors: Vec<PropertyError>) -> Self {
        Self::new(object, errors.into_iter().map(FieldFailure::Property).collect())
    }

    pub fn property_errors(&self) -> impl Iterator<Item = &PropertyError> {
        self.errors.iter().filter_map(|e| match e {
            FieldFailure::Property(p) => Some(p),
            FieldFailure::Message(_) => None,
        })
    }
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b = format!("Validation for {} '{}'", self.object.kind, self.object.name);
        if self.object.is_project_scoped && !self.object.project.is_empty() {
            b.push_str(&format!(" in project '{}'", self.object.project));
        }
        b.push_str(" has failed for the following fields:\n");
        join_errors(&mut b, &self.errors, "  ");
        if !self.object.source.is_empty() {
            b.push_str(&format!("\nManifest source: {}", self.object.source));
        }
        f.write_str(&b)
    }
}

impl std::error::Error for ObjectError {}

impl HasErrorCode for ObjectError {
    fn has_error_code(&self, code: &str) -> bool {
        self.property_errors().any(|p| p.has_error_code(code))
    }
}

/// Every failure of a batch validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectErrors(pub Vec<ObjectError>);

impl ObjectErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectError> {
        self.0.iter()
    }
}

impl fmt::Display for ObjectErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join("\n"))
    }
}

impl std::error::Error for ObjectErrors {}

/// Runs `validator` and attaches the object's identity to the failures.
pub fn validate_object<M: Manifest>(validator: &Validator<M>, object: &M) -> Result<(), ObjectError>
where
    M: 'static,
{
    validator
        .validate(object)
        .map_err(|err| ObjectError::from_properties(ObjectMetadata::of(object), err.errors))
}

/// Validates every object and returns all failures together.
pub fn validate_objects(objects: &[Object]) -> Result<(), ObjectErrors> {
    let errors: Vec<ObjectError> = objects.iter().filter_map(|o| o.validate().err()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ObjectErrors(errors))
    }
}

//! n9 core object model: kinds, object headers, the `Object` sum type, object
//! errors and the `n9/v1alpha` manifests.

#![forbid(unsafe_code)]

mod errors;
mod kind;
mod object;
pub mod v1alpha;

pub use errors::{validate_object, validate_objects, FieldFailure, ObjectError, ObjectErrors, ObjectMetadata};
pub use kind::{version, Kind, ParseKindError};
pub use object::{Manifest, Object, ObjectFormat, ObjectHeader, ParseError, ProjectScoped};

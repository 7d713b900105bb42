use n9_validation::{for_field, string_description, Validator};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::metadata::{metadata_display_name, metadata_labels, metadata_name, metadata_project, Metadata};
use crate::kind::{version, Kind};
use crate::object::ObjectHeader;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(flatten)]
    pub header: ObjectHeader,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: ServiceSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Service {
    pub fn new(metadata: Metadata, spec: ServiceSpec) -> Self {
        Self { header: ObjectHeader::new(version::V1ALPHA, Kind::Service), metadata, spec }
    }
}

pub(crate) static VALIDATOR: Lazy<Validator<Service>> = Lazy::new(|| {
    Validator::new()
        .property(metadata_name(|s: &Service| s.metadata.name.clone()))
        .property(metadata_display_name(|s: &Service| s.metadata.display_name.clone()))
        .property(metadata_project(|s: &Service| s.metadata.project.clone()))
        .property(metadata_labels(|s: &Service| s.metadata.labels.clone()))
        .property(for_field(|s: &Service| s.spec.description.clone()).with_name("spec.description").rule(string_description()))
});

impl_manifest!(Service, VALIDATOR, project_scoped);

use n9_validation::{for_field, string_description, Validator};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::metadata::{metadata_display_name, metadata_labels, metadata_name, ProjectMetadata};
use crate::kind::{version, Kind};
use crate::object::ObjectHeader;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub header: ObjectHeader,
    #[serde(default)]
    pub metadata: ProjectMetadata,
    #[serde(default)]
    pub spec: ProjectSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Project {
    pub fn new(metadata: ProjectMetadata, spec: ProjectSpec) -> Self {
        Self { header: ObjectHeader::new(version::V1ALPHA, Kind::Project), metadata, spec }
    }
}

pub(crate) static VALIDATOR: Lazy<Validator<Project>> = Lazy::new(|| {
    Validator::new()
        .property(metadata_name(|p: &Project| p.metadata.name.clone()))
        .property(metadata_display_name(|p: &Project| p.metadata.display_name.clone()))
        .property(metadata_labels(|p: &Project| p.metadata.labels.clone()))
        .property(for_field(|p: &Project| p.spec.description.clone()).with_name("spec.description").rule(string_description()))
});

impl_manifest!(Project, VALIDATOR);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Manifest;

    #[test]
    fn project_is_not_project_scoped() {
        let p = Project::new(ProjectMetadata { name: "default".into(), ..Default::default() }, ProjectSpec::default());
        assert!(p.project().is_none());
        assert!(p.validate().is_ok());
        let err = Project::new(ProjectMetadata::default(), ProjectSpec { description: "d".repeat(1100) })
            .validate()
            .unwrap_err();
        assert!(!err.object.is_project_scoped);
        let paths: Vec<&str> = err.property_errors().map(|e| e.property_name.as_str()).collect();
        assert_eq!(paths, ["metadata.name", "spec.description"]);
    }
}

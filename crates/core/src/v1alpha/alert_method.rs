use n9_validation::{
    for_field, for_option, for_slice, get_self, mutually_exclusive, slice_min_length, string_contains,
    string_description, string_url, Validator,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::metadata::{metadata_display_name, metadata_labels, metadata_name, metadata_project, Metadata};
use crate::kind::{version, Kind};
use crate::object::ObjectHeader;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertMethod {
    #[serde(flatten)]
    pub header: ObjectHeader,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: AlertMethodSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertMethodSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebhookMethod {
    #[serde(default)]
    pub url: String,
}

/// The Slack URL embeds a secret token and is never echoed in errors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlackMethod {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmailMethod {
    #[serde(default)]
    pub to: Vec<String>,
}

impl AlertMethod {
    pub fn new(metadata: Metadata, spec: AlertMethodSpec) -> Self {
        Self { header: ObjectHeader::new(version::V1ALPHA, Kind::AlertMethod), metadata, spec }
    }
}

fn spec_validator() -> Validator<AlertMethodSpec> {
    Validator::new()
        .property(
            for_field(get_self::<AlertMethodSpec>()).rule(
                mutually_exclusive(true)
                    .with("webhook", |s: &AlertMethodSpec| s.webhook.is_some())
                    .with("slack", |s: &AlertMethodSpec| s.slack.is_some())
                    .with("email", |s: &AlertMethodSpec| s.email.is_some()),
            ),
        )
        .property(
            for_field(|s: &AlertMethodSpec| s.description.clone())
                .with_name("description")
                .rule(string_description()),
        )
        .property(
            for_option(|s: &AlertMethodSpec| s.webhook.as_ref().map(|w| w.url.clone()))
                .with_name("webhook.url")
                .rule(string_url()),
        )
        .property(
            for_option(|s: &AlertMethodSpec| s.slack.as_ref().map(|w| w.url.clone()))
                .with_name("slack.url")
                .hide_value()
                .rule(string_url()),
        )
        .property(
            for_slice(|s: &AlertMethodSpec| s.email.as_ref().map(|e| e.to.clone()).unwrap_or_default())
                .with_name("email.to")
                .when(|s: &AlertMethodSpec| s.email.is_some())
                .stop_on_error()
                .rules(slice_min_length(1))
                .rules_for_each(string_contains(&["@"])),
        )
}

pub(crate) static VALIDATOR: Lazy<Validator<AlertMethod>> = Lazy::new(|| {
    Validator::new()
        .property(metadata_name(|m: &AlertMethod| m.metadata.name.clone()))
        .property(metadata_display_name(|m: &AlertMethod| m.metadata.display_name.clone()))
        .property(metadata_project(|m: &AlertMethod| m.metadata.project.clone()))
        .property(metadata_labels(|m: &AlertMethod| m.metadata.labels.clone()))
        .property(for_field(|m: &AlertMethod| m.spec.clone()).with_name("spec").include(spec_validator()))
});

impl_manifest!(AlertMethod, VALIDATOR, project_scoped);

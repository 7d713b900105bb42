use std::collections::BTreeMap;

use n9_validation::{
    for_field, for_map, for_slice, get_self, self_hash, slice_unique, string_deny_regexp, string_is_dns_subdomain,
    string_length, string_match_regexp, PropertyRules, PropertyRulesForMap, RuleSet, Validator,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label key to list of values.
pub type Labels = BTreeMap<String, Vec<String>>;

static LABEL_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}([_\-0-9\p{L}]*[0-9\p{L}])?$").unwrap());
static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Lu}").unwrap());

/// Metadata of project-scoped objects.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
}

impl Metadata {
    pub fn named(name: &str, project: &str) -> Self {
        Self { name: name.to_string(), project: project.to_string(), ..Self::default() }
    }
}

/// Metadata of a project, which has no enclosing project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
}

pub(crate) fn metadata_name<S, F>(getter: F) -> PropertyRules<String, S>
where
    S: 'static,
    F: Fn(&S) -> String + Send + Sync + 'static,
{
    for_field(getter).with_name("metadata.name").required().rule(string_is_dns_subdomain())
}

pub(crate) fn metadata_display_name<S, F>(getter: F) -> PropertyRules<String, S>
where
    S: 'static,
    F: Fn(&S) -> String + Send + Sync + 'static,
{
    for_field(getter).with_name("metadata.displayName").omit_empty().rule(string_length(0, 63))
}

pub(crate) fn metadata_project<S, F>(getter: F) -> PropertyRules<String, S>
where
    S: 'static,
    F: Fn(&S) -> String + Send + Sync + 'static,
{
    for_field(getter).with_name("metadata.project").omit_empty().rule(string_is_dns_subdomain())
}

fn label_key_rules() -> RuleSet<String> {
    RuleSet::new()
        .rule(string_length(1, 63))
        .rule(string_match_regexp(LABEL_KEY.clone(), &["my-label", "label_2"]))
        .rule(string_deny_regexp(UPPERCASE.clone(), &[]).with_details("label key must not have uppercase letters"))
}

fn label_values_validator() -> Validator<Vec<String>> {
    Validator::new().property(
        for_slice(get_self::<Vec<String>>())
            .rules(slice_unique(self_hash::<String>(), &[]))
            .rules_for_each(string_length(1, 200)),
    )
}

pub(crate) fn metadata_labels<S, F>(getter: F) -> PropertyRulesForMap<String, Vec<String>, S>
where
    S: 'static,
    F: Fn(&S) -> Labels + Send + Sync + 'static,
{
    for_map(getter)
        .with_name("metadata.labels")
        .rules_for_keys(label_key_rules())
        .include_for_values(label_values_validator())
}

#[cfg(test)]
mod tests {
    use super::*;
    use n9_validation::{codes, has_error_code};

    fn validator() -> Validator<Metadata> {
        Validator::new()
            .property(metadata_name(|m: &Metadata| m.name.clone()))
            .property(metadata_display_name(|m: &Metadata| m.display_name.clone()))
            .property(metadata_project(|m: &Metadata| m.project.clone()))
            .property(metadata_labels(|m: &Metadata| m.labels.clone()))
    }

    #[test]
    fn valid_metadata() {
        let mut m = Metadata::named("api-server", "default");
        m.labels.insert("team".into(), vec!["green".into(), "blue".into()]);
        assert!(validator().validate(&m).is_ok());
    }

    #[test]
    fn name_is_required() {
        let err = validator().validate(&Metadata::default()).unwrap_err();
        assert_eq!(err.errors[0].property_name, "metadata.name");
        assert!(has_error_code(&err, codes::REQUIRED));
    }

    #[test]
    fn label_failures() {
        let mut m = Metadata::named("x", "");
        m.labels.insert("Team".into(), vec!["a".into()]);
        m.labels.insert("env".into(), vec!["prod".into(), String::new(), "prod".into()]);
        let err = validator().validate(&m).unwrap_err();
        let names: Vec<&str> = err.errors.iter().map(|e| e.property_name.as_str()).collect();
        assert_eq!(names, ["metadata.labels.Team", "metadata.labels.env", "metadata.labels.env[1]"]);
        assert!(err.errors[0].is_key_error);
        assert!(has_error_code(&err.errors[0], codes::STRING_DENY_REGEXP));
        assert!(has_error_code(&err.errors[1], codes::SLICE_UNIQUE));
        assert!(has_error_code(&err.errors[2], codes::STRING_LENGTH));
    }
}

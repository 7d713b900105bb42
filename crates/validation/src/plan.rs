//! Validation plans: a static description of every property a validator
//! checks and the rules applied to it.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::codes;
use crate::validator::Validator;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePlan {
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
}

impl RulePlan {
    pub(crate) fn required() -> Self {
        Self {
            description: "property is required".to_string(),
            error_code: codes::REQUIRED.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPlan {
    pub path: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RulePlan>,
}

/// Position in the validated structure while walking a validator.
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    path: String,
    conditions: Vec<String>,
    type_name: String,
    is_optional: bool,
    is_hidden: bool,
    examples: Vec<String>,
}

impl PlanBuilder {
    pub(crate) fn root() -> Self {
        Self { path: "$".to_string(), ..Self::default() }
    }

    pub(crate) fn child(&self, name: &str) -> Self {
        let mut next = self.clone();
        if !name.is_empty() {
            if !name.starts_with('[') {
                next.path.push('.');
            }
            next.path.push_str(name);
            next.examples.clear();
        }
        next
    }

    pub(crate) fn with_conditions(mut self, conditions: Vec<String>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub(crate) fn with_property<T>(mut self, is_optional: bool, is_hidden: bool, examples: &[String]) -> Self {
        self.type_name = short_type_name(std::any::type_name::<T>());
        self.is_optional = is_optional;
        self.is_hidden = self.is_hidden || is_hidden;
        self.examples.extend(examples.iter().cloned());
        self
    }
}

/// Collects rule plans keyed by path.
#[derive(Debug, Default)]
pub struct PlanSink {
    properties: BTreeMap<String, PropertyPlan>,
}

impl PlanSink {
    pub(crate) fn record(&mut self, b: &PlanBuilder, rules: Vec<RulePlan>) {
        let entry = self.properties.entry(b.path.clone()).or_insert_with(|| PropertyPlan {
            path: b.path.clone(),
            type_name: b.type_name.clone(),
            is_optional: b.is_optional,
            is_hidden: b.is_hidden,
            examples: b.examples.clone(),
            rules: Vec::new(),
        });
        entry.rules.extend(rules.into_iter().map(|mut r| {
            r.conditions.extend(b.conditions.iter().cloned());
            r
        }));
    }

    fn into_plans(self) -> Vec<PropertyPlan> {
        self.properties.into_values().collect()
    }
}

static MODULE_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z_][a-z0-9_]*::").unwrap());

fn short_type_name(full: &str) -> String {
    MODULE_PATH.replace_all(full, "").into_owned()
}

/// Describes every property checked by `validator`, ordered by path.
pub fn plan<S: 'static>(validator: &Validator<S>) -> Vec<PropertyPlan> {
    let mut sink = PlanSink::default();
    validator.plan_into(&PlanBuilder::root(), &mut sink);
    sink.into_plans()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_drop_module_paths() {
        assert_eq!(short_type_name("alloc::string::String"), "String");
        assert_eq!(short_type_name("alloc::vec::Vec<n9_core::v1alpha::slo::Objective>"), "Vec<Objective>");
        assert_eq!(short_type_name("core::option::Option<f64>"), "Option<f64>");
    }

    #[test]
    fn child_paths() {
        let root = PlanBuilder::root();
        assert_eq!(root.child("spec").child("items").child("[*]").path, "$.spec.items[*]");
        assert_eq!(root.child("").path, "$");
    }
}

use n9_validation::{
    duration_precision, for_field, for_option, for_slice, get_self, greater_than_or_equal_to, less_than_or_equal_to,
    mutually_exclusive, one_of, slice_min_length, string_description, string_is_dns_subdomain, transform, Duration,
    RuleError, SingleRule, Validator,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::{metadata_display_name, metadata_labels, metadata_name, metadata_project, Metadata};
use crate::kind::{version, Kind};
use crate::object::ObjectHeader;

const SEVERITIES: [&str; 3] = ["Low", "Medium", "High"];
const MEASUREMENTS: [&str; 5] = ["timeToBurnBudget", "timeToBurnEntireBudget", "burnRate", "averageBurnRate", "budgetDrop"];
const OPERATORS: [&str; 4] = ["lt", "lte", "gt", "gte"];
const MIN_COOL_DOWN: Duration = Duration::from_mins(5);
const MIN_ALERTING_WINDOW: Duration = Duration::from_mins(5);
const MAX_ALERTING_WINDOW: Duration = Duration::from_hours(7 * 24);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertPolicy {
    #[serde(flatten)]
    pub header: ObjectHeader,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: AlertPolicySpec,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPolicySpec {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default, rename = "coolDown", skip_serializing_if = "String::is_empty")]
    pub cool_down: String,
    #[serde(default)]
    pub conditions: Vec<AlertCondition>,
    #[serde(default)]
    pub alert_methods: Vec<AlertMethodRef>,
}

/// `value` is a duration string for time-to-burn measurements and a number
/// for the others.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCondition {
    #[serde(default)]
    pub measurement: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alerting_window: String,
    #[serde(default, rename = "lastsFor", skip_serializing_if = "String::is_empty")]
    pub lasts_for: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertMethodRef {
    #[serde(default)]
    pub metadata: AlertMethodRefMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertMethodRefMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
}

impl AlertPolicy {
    pub fn new(metadata: Metadata, spec: AlertPolicySpec) -> Self {
        Self { header: ObjectHeader::new(version::V1ALPHA, Kind::AlertPolicy), metadata, spec }
    }
}

fn is_time_to_burn(c: &AlertCondition) -> bool {
    matches!(c.measurement.as_str(), "timeToBurnBudget" | "timeToBurnEntireBudget")
}

fn duration_value() -> SingleRule<Value> {
    SingleRule::new(|v: &Value| match v {
        Value::String(s) => s.parse::<Duration>().map(|_| ()).map_err(|e| RuleError::new(e.to_string())),
        _ => Err("must be a duration string".into()),
    })
    .with_description("must be a duration string such as '30m'")
}

fn numeric_value() -> SingleRule<Value> {
    SingleRule::new(|v: &Value| match v {
        Value::Number(_) => Ok(()),
        Value::String(s) if s.trim().parse::<f64>().is_ok() => Ok(()),
        _ => Err("must be a number".into()),
    })
    .with_description("must be a number")
}

fn condition_validator() -> Validator<AlertCondition> {
    Validator::new()
        .property(
            for_field(get_self::<AlertCondition>()).rule(
                mutually_exclusive(false)
                    .with("alertingWindow", |c: &AlertCondition| !c.alerting_window.is_empty())
                    .with("lastsFor", |c: &AlertCondition| !c.lasts_for.is_empty()),
            ),
        )
        .property(
            for_field(|c: &AlertCondition| c.measurement.clone())
                .with_name("measurement")
                .required()
                .rule(one_of(MEASUREMENTS)),
        )
        .property(
            for_field(|c: &AlertCondition| c.value.clone())
                .with_name("value")
                .required()
                .rule(duration_value())
                .when_described(is_time_to_burn, "measurement is timeToBurnBudget or timeToBurnEntireBudget"),
        )
        .property(
            for_field(|c: &AlertCondition| c.value.clone())
                .with_name("value")
                .required()
                .rule(numeric_value())
                .when(|c: &AlertCondition| !is_time_to_burn(c)),
        )
        .property(
            transform(|c: &AlertCondition| c.alerting_window.clone(), |d: &String| d.parse::<Duration>())
                .with_name("alertingWindow")
                .omit_empty()
                .rule(greater_than_or_equal_to(MIN_ALERTING_WINDOW))
                .rule(less_than_or_equal_to(MAX_ALERTING_WINDOW))
                .rule(duration_precision(Duration::from_mins(1))),
        )
        .property(
            transform(|c: &AlertCondition| c.lasts_for.clone(), |d: &String| d.parse::<Duration>())
                .with_name("lastsFor")
                .omit_empty()
                .rule(greater_than_or_equal_to(Duration::ZERO)),
        )
        .property(for_option(|c: &AlertCondition| c.op.clone()).with_name("op").rule(one_of(OPERATORS)))
}

fn alert_method_ref_validator() -> Validator<AlertMethodRef> {
    Validator::new()
        .property(
            for_field(|r: &AlertMethodRef| r.metadata.name.clone())
                .with_name("metadata.name")
                .required()
                .rule(string_is_dns_subdomain()),
        )
        .property(
            for_field(|r: &AlertMethodRef| r.metadata.project.clone())
                .with_name("metadata.project")
                .omit_empty()
                .rule(string_is_dns_subdomain()),
        )
}

fn spec_validator() -> Validator<AlertPolicySpec> {
    Validator::new()
        .property(
            for_field(|s: &AlertPolicySpec| s.description.clone())
                .with_name("description")
                .rule(string_description()),
        )
        .property(
            for_field(|s: &AlertPolicySpec| s.severity.clone())
                .with_name("severity")
                .required()
                .rule(one_of(SEVERITIES)),
        )
        .property(
            transform(|s: &AlertPolicySpec| s.cool_down.clone(), |d: &String| d.parse::<Duration>())
                .with_name("coolDown")
                .with_examples(&["5m", "1h"])
                .omit_empty()
                .rule(greater_than_or_equal_to(MIN_COOL_DOWN))
                .rule(duration_precision(Duration::from_secs(1))),
        )
        .property(
            for_slice(|s: &AlertPolicySpec| s.conditions.clone())
                .with_name("conditions")
                .stop_on_error()
                .rules(slice_min_length(1))
                .include_for_each(condition_validator()),
        )
        .property(
            for_slice(|s: &AlertPolicySpec| s.alert_methods.clone())
                .with_name("alertMethods")
                .include_for_each(alert_method_ref_validator()),
        )
}

pub(crate) static VALIDATOR: Lazy<Validator<AlertPolicy>> = Lazy::new(|| {
    Validator::new()
        .property(metadata_name(|p: &AlertPolicy| p.metadata.name.clone()))
        .property(metadata_display_name(|p: &AlertPolicy| p.metadata.display_name.clone()))
        .property(metadata_project(|p: &AlertPolicy| p.metadata.project.clone()))
        .property(metadata_labels(|p: &AlertPolicy| p.metadata.labels.clone()))
        .property(for_field(|p: &AlertPolicy| p.spec.clone()).with_name("spec").include(spec_validator()))
});

impl_manifest!(AlertPolicy, VALIDATOR, project_scoped);

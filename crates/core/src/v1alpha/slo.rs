use n9_validation::{
    for_field, for_option, for_slice, get_self, greater_than, greater_than_or_equal_to, less_than,
    less_than_or_equal_to, one_of, slice_length, slice_min_length, slice_unique, string_description,
    string_is_dns_subdomain, string_length, SingleRule, Validator,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::metadata::{metadata_display_name, metadata_labels, metadata_name, metadata_project, Metadata};
use crate::kind::{version, Kind};
use crate::object::ObjectHeader;

pub const BUDGETING_METHOD_OCCURRENCES: &str = "Occurrences";
pub const BUDGETING_METHOD_TIMESLICES: &str = "Timeslices";

const TIME_UNITS: [&str; 7] = ["Minute", "Hour", "Day", "Week", "Month", "Quarter", "Year"];
const OPERATORS: [&str; 4] = ["lt", "lte", "gt", "gte"];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Slo {
    #[serde(flatten)]
    pub header: ObjectHeader,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: SloSpec,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SloSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<Indicator>,
    #[serde(default)]
    pub budgeting_method: String,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub time_windows: Vec<TimeWindow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alert_policies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    #[serde(default)]
    pub metric_source: MetricSource,
}

/// Reference to the agent feeding the indicator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSource {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
    #[serde(default, skip_serializing_if = "Kind::is_unknown")]
    pub kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slice_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub is_rolling: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<Calendar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub time_zone: String,
}

impl Slo {
    pub fn new(metadata: Metadata, spec: SloSpec) -> Self {
        Self { header: ObjectHeader::new(version::V1ALPHA, Kind::Slo), metadata, spec }
    }
}

fn indicator_validator() -> Validator<Indicator> {
    Validator::new()
        .property(
            for_field(|i: &Indicator| i.metric_source.name.clone())
                .with_name("metricSource.name")
                .required()
                .rule(string_is_dns_subdomain()),
        )
        .property(
            for_field(|i: &Indicator| i.metric_source.project.clone())
                .with_name("metricSource.project")
                .omit_empty()
                .rule(string_is_dns_subdomain()),
        )
        .property(
            for_field(|i: &Indicator| i.metric_source.kind)
                .with_name("metricSource.kind")
                .omit_empty()
                .rule(one_of([Kind::Agent])),
        )
}

fn objective_validator() -> Validator<Objective> {
    Validator::new()
        .property(
            for_field(|o: &Objective| o.display_name.clone())
                .with_name("displayName")
                .omit_empty()
                .rule(string_length(0, 63)),
        )
        .property(for_field(|o: &Objective| o.name.clone()).with_name("name").omit_empty().rule(string_is_dns_subdomain()))
        .property(
            for_option(|o: &Objective| o.target)
                .with_name("target")
                .required()
                .rule(greater_than_or_equal_to(0.0))
                .rule(less_than(1.0)),
        )
        .property(for_option(|o: &Objective| o.op.clone()).with_name("op").rule(one_of(OPERATORS)))
}

fn time_slice_validator() -> Validator<Objective> {
    Validator::new().property(
        for_option(|o: &Objective| o.time_slice_target)
            .with_name("timeSliceTarget")
            .required()
            .rule(greater_than(0.0))
            .rule(less_than_or_equal_to(1.0)),
    )
}

fn calendar_validator() -> Validator<Calendar> {
    Validator::new()
        .property(for_field(|c: &Calendar| c.start_time.clone()).with_name("startTime").required())
        .property(for_field(|c: &Calendar| c.time_zone.clone()).with_name("timeZone").required())
}

fn time_window_validator() -> Validator<TimeWindow> {
    Validator::new()
        .property(for_field(|w: &TimeWindow| w.unit.clone()).with_name("unit").required().rule(one_of(TIME_UNITS)))
        .property(for_field(|w: &TimeWindow| w.count).with_name("count").rule(greater_than(0)))
        .property(
            for_option(|w: &TimeWindow| w.calendar.clone())
                .with_name("calendar")
                .when_described(|w: &TimeWindow| !w.is_rolling, "isRolling is false")
                .required()
                .include(calendar_validator()),
        )
        .property(for_field(get_self::<TimeWindow>()).rule(SingleRule::new(|w: &TimeWindow| {
            if w.is_rolling && w.calendar.is_some() {
                Err("calendar cannot be set when isRolling is true".into())
            } else {
                Ok(())
            }
        })))
}

fn spec_validator() -> Validator<SloSpec> {
    Validator::new()
        .property(for_field(|s: &SloSpec| s.description.clone()).with_name("description").rule(string_description()))
        .property(for_field(|s: &SloSpec| s.service.clone()).with_name("service").required().rule(string_is_dns_subdomain()))
        .property(for_option(|s: &SloSpec| s.indicator.clone()).with_name("indicator").include(indicator_validator()))
        .property(
            for_field(|s: &SloSpec| s.budgeting_method.clone())
                .with_name("budgetingMethod")
                .required()
                .rule(one_of([BUDGETING_METHOD_OCCURRENCES, BUDGETING_METHOD_TIMESLICES])),
        )
        .property(
            for_slice(|s: &SloSpec| s.objectives.clone())
                .with_name("objectives")
                .stop_on_error()
                .rules(slice_min_length(1))
                .rules(slice_unique(|o: &Objective| (o.name.clone(), o.value.map(f64::to_bits)), &["name", "value"]))
                .include_for_each(objective_validator()),
        )
        .property(
            for_slice(|s: &SloSpec| s.objectives.clone())
                .with_name("objectives")
                .when_described(
                    |s: &SloSpec| s.budgeting_method == BUDGETING_METHOD_TIMESLICES,
                    "budgetingMethod is Timeslices",
                )
                .include_for_each(time_slice_validator()),
        )
        .property(
            for_slice(|s: &SloSpec| s.time_windows.clone())
                .with_name("timeWindows")
                .stop_on_error()
                .rules(slice_length(1, 1))
                .include_for_each(time_window_validator()),
        )
        .property(
            for_slice(|s: &SloSpec| s.alert_policies.clone())
                .with_name("alertPolicies")
                .rules_for_each(string_is_dns_subdomain()),
        )
}

pub(crate) static VALIDATOR: Lazy<Validator<Slo>> = Lazy::new(|| {
    Validator::new()
        .property(metadata_name(|s: &Slo| s.metadata.name.clone()))
        .property(metadata_display_name(|s: &Slo| s.metadata.display_name.clone()))
        .property(metadata_project(|s: &Slo| s.metadata.project.clone()))
        .property(metadata_labels(|s: &Slo| s.metadata.labels.clone()))
        .property(for_field(|s: &Slo| s.spec.clone()).with_name("spec").include(spec_validator()))
});

impl_manifest!(Slo, VALIDATOR, project_scoped);

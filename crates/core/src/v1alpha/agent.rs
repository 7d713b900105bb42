use n9_validation::{
    duration_precision, for_field, for_option, get_self, greater_than_or_equal_to, less_than_or_equal_to,
    mutually_exclusive, one_of, string_description, string_url, transform, Duration, Validator,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::metadata::{metadata_display_name, metadata_labels, metadata_name, metadata_project, Metadata};
use crate::kind::{version, Kind};
use crate::object::ObjectHeader;

const RELEASE_CHANNELS: [&str; 2] = ["stable", "beta"];
const DATADOG_SITES: [&str; 8] = [
    "eu",
    "com",
    "datadoghq.com",
    "us3.datadoghq.com",
    "us5.datadoghq.com",
    "datadoghq.eu",
    "ddog-gov.com",
    "ap1.datadoghq.com",
];
const MAX_QUERY_DELAY: Duration = Duration::from_hours(24);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Agent {
    #[serde(flatten)]
    pub header: ObjectHeader,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: AgentSpec,
}

/// Exactly one data source section must be present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datadog: Option<DatadogConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_relic: Option<NewRelicConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_delay: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatadogConfig {
    #[serde(default)]
    pub site: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelicConfig {
    #[serde(default, rename = "accountID")]
    pub account_id: i64,
}

impl Agent {
    pub fn new(metadata: Metadata, spec: AgentSpec) -> Self {
        Self { header: ObjectHeader::new(version::V1ALPHA, Kind::Agent), metadata, spec }
    }
}

fn spec_validator() -> Validator<AgentSpec> {
    Validator::new()
        .property(
            for_field(get_self::<AgentSpec>()).rule(
                mutually_exclusive(true)
                    .with("prometheus", |s: &AgentSpec| s.prometheus.is_some())
                    .with("datadog", |s: &AgentSpec| s.datadog.is_some())
                    .with("newRelic", |s: &AgentSpec| s.new_relic.is_some()),
            ),
        )
        .property(for_field(|s: &AgentSpec| s.description.clone()).with_name("description").rule(string_description()))
        .property(
            for_field(|s: &AgentSpec| s.release_channel.clone())
                .with_name("releaseChannel")
                .omit_empty()
                .rule(one_of(RELEASE_CHANNELS)),
        )
        .property(
            transform(|s: &AgentSpec| s.query_delay.clone().unwrap_or_default(), |d: &String| d.parse::<Duration>())
                .with_name("queryDelay")
                .with_examples(&["1m", "1h30m"])
                .omit_empty()
                .rule(less_than_or_equal_to(MAX_QUERY_DELAY))
                .rule(duration_precision(Duration::from_secs(1))),
        )
        .property(
            for_option(|s: &AgentSpec| s.prometheus.as_ref().map(|p| p.url.clone()))
                .with_name("prometheus.url")
                .required()
                .rule(string_url())
                .when(|s: &AgentSpec| s.prometheus.is_some()),
        )
        .property(
            for_option(|s: &AgentSpec| s.datadog.as_ref().map(|d| d.site.clone()))
                .with_name("datadog.site")
                .required()
                .rule(one_of(DATADOG_SITES))
                .when(|s: &AgentSpec| s.datadog.is_some()),
        )
        .property(
            for_option(|s: &AgentSpec| s.new_relic.as_ref().map(|n| n.account_id))
                .with_name("newRelic.accountID")
                .required()
                .rule(greater_than_or_equal_to(1))
                .when(|s: &AgentSpec| s.new_relic.is_some()),
        )
}

pub(crate) static VALIDATOR: Lazy<Validator<Agent>> = Lazy::new(|| {
    Validator::new()
        .property(metadata_name(|a: &Agent| a.metadata.name.clone()))
        .property(metadata_display_name(|a: &Agent| a.metadata.display_name.clone()))
        .property(metadata_project(|a: &Agent| a.metadata.project.clone()))
        .property(metadata_labels(|a: &Agent| a.metadata.labels.clone()))
        .property(for_field(|a: &Agent| a.spec.clone()).with_name("spec").include(spec_validator()))
});

impl_manifest!(Agent, VALIDATOR, project_scoped);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Manifest;
    use n9_validation::{codes, HasErrorCode};

    fn prometheus_agent() -> Agent {
        Agent::new(
            Metadata::named("prom", "default"),
            AgentSpec {
                prometheus: Some(PrometheusConfig { url: "https://prometheus.example.com".into() }),
                ..AgentSpec::default()
            },
        )
    }

    #[test]
    fn valid_agent() {
        let mut a = prometheus_agent();
        a.spec.query_delay = Some("5m".into());
        a.spec.release_channel = "beta".into();
        assert!(a.validate().is_ok());
    }

    #[test]
    fn exactly_one_data_source() {
        let mut a = prometheus_agent();
        a.spec.prometheus = None;
        let err = a.validate().unwrap_err();
        let e = err.property_errors().next().unwrap();
        assert_eq!(e.property_name, "spec");
        assert!(e.has_error_code(codes::MUTUALLY_EXCLUSIVE));

        let mut a = prometheus_agent();
        a.spec.datadog = Some(DatadogConfig { site: "eu".into() });
        let err = a.validate().unwrap_err();
        assert!(err.to_string().contains("[datadog, prometheus] properties are mutually exclusive"));
    }

    #[test]
    fn query_delay_bounds() {
        let mut a = prometheus_agent();
        a.spec.query_delay = Some("25h".into());
        let err = a.validate().unwrap_err();
        let e = err.property_errors().next().unwrap();
        assert_eq!(e.property_name, "spec.queryDelay");
        assert_eq!(e.property_value, "25h0m0s");
        assert!(e.has_error_code(codes::LESS_THAN_OR_EQUAL_TO));

        a.spec.query_delay = Some("soon".into());
        let err = a.validate().unwrap_err();
        let e = err.property_errors().next().unwrap();
        assert_eq!(e.property_value, "soon");
        assert!(e.has_error_code(codes::TRANSFORM));
    }

    #[test]
    fn data_source_fields() {
        let a = Agent::new(
            Metadata::named("dd", "default"),
            AgentSpec { datadog: Some(DatadogConfig { site: "mars".into() }), ..AgentSpec::default() },
        );
        let err = a.validate().unwrap_err();
        assert_eq!(err.property_errors().next().unwrap().property_name, "spec.datadog.site");
        assert!(err.has_error_code(codes::ONE_OF));

        let a = Agent::new(
            Metadata::named("nr", "default"),
            AgentSpec { new_relic: Some(NewRelicConfig { account_id: 0 }), ..AgentSpec::default() },
        );
        let err = a.validate().unwrap_err();
        assert_eq!(err.property_errors().next().unwrap().property_name, "spec.newRelic.accountID");
    }
}

use n9_core::v1alpha::alert_policy::{AlertCondition, AlertPolicySpec};
use n9_core::v1alpha::service::ServiceSpec;
use n9_core::v1alpha::{parse_object, AlertPolicy, Metadata, Project, ProjectMetadata, Service};
use n9_core::{validate_objects, Kind, Manifest, Object, ObjectError, ObjectFormat, ProjectScoped};
use n9_validation::{codes, HasErrorCode};
use serde_json::json;

fn policy(severity: &str) -> AlertPolicy {
    AlertPolicy::new(
        Metadata::named("slow-burn", "default"),
        AlertPolicySpec {
            severity: severity.into(),
            conditions: vec![AlertCondition {
                measurement: "burnRate".into(),
                value: json!(1),
                ..AlertCondition::default()
            }],
            ..AlertPolicySpec::default()
        },
    )
}

#[test]
fn invalid_severity_reports_one_property() {
    let err = policy("Highest").validate().unwrap_err();
    let props: Vec<_> = err.property_errors().collect();
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].property_name, "spec.severity");
    assert!(props[0].has_error_code(codes::ONE_OF));
    assert_eq!(
        err.to_string(),
        "Validation for AlertPolicy 'slow-burn' in project 'default' has failed for the following fields:\n  \
         - 'spec.severity' with value 'Highest':\n    - must be one of [Low, Medium, High]"
    );
}

#[test]
fn object_error_survives_json() {
    let err = policy("Highest").with_manifest_source("/tmp/policy.yaml").validate().unwrap_err();
    assert!(err.to_string().ends_with("\nManifest source: /tmp/policy.yaml"));
    let encoded = serde_json::to_string(&err).unwrap();
    let decoded: ObjectError = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, err);
}

#[test]
fn batch_validation_collects_every_failure() {
    let objects: Vec<Object> = vec![
        Project::new(ProjectMetadata { name: "default".into(), ..Default::default() }, Default::default()).into(),
        policy("Urgent").into(),
        Service::new(Metadata::named("", "default"), ServiceSpec::default()).into(),
    ];
    let errs = validate_objects(&objects).unwrap_err();
    assert_eq!(errs.len(), 2);
    let kinds: Vec<Kind> = errs.iter().map(|e| e.object.kind).collect();
    assert_eq!(kinds, [Kind::AlertPolicy, Kind::Service]);
    assert!(errs.to_string().contains("\nValidation for Service ''"));
}

#[test]
fn conversions_and_project_override() {
    let obj = Object::from(policy("Low")).with_project("payments");
    assert_eq!(obj.project(), Some("payments"));
    assert!(obj.is_project_scoped());

    let back = AlertPolicy::try_from(obj.clone()).unwrap();
    assert_eq!(back.metadata.project, "payments");
    let other = Service::try_from(obj).unwrap_err();
    assert_eq!(other.kind(), Kind::AlertPolicy);

    let service = Service::new(Metadata::named("api", "a"), ServiceSpec::default()).with_project("b");
    assert_eq!(service.project(), Some("b"));
}

#[test]
fn yaml_slo_round_trip() {
    let yaml = br#"
apiVersion: n9/v1alpha
kind: SLO
metadata:
  name: latency
  project: default
  labels:
    team: [green]
spec:
  service: api
  budgetingMethod: Occurrences
  objectives:
    - value: 200
      target: 0.95
      op: lte
  timeWindows:
    - unit: Day
      count: 7
      isRolling: true
"#;
    let obj = parse_object(yaml, Kind::Slo, ObjectFormat::Yaml).unwrap();
    assert_eq!(obj.kind(), Kind::Slo);
    assert_eq!(obj.api_version(), "n9/v1alpha");
    assert!(obj.validate().is_ok());

    let json = serde_json::to_vec(&obj).unwrap();
    let again = parse_object(&json, Kind::Slo, ObjectFormat::Json).unwrap();
    assert_eq!(again, obj);
}

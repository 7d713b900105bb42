use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Known API versions.
pub mod version {
    pub const V1ALPHA: &str = "n9/v1alpha";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Kind {
    /// Missing, empty or unrecognised `kind`.
    #[default]
    Unknown,
    Project,
    Service,
    Slo,
    Agent,
    AlertPolicy,
    AlertMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a valid Kind, try [{}]", Kind::names().join(", "))]
pub struct ParseKindError(pub String);

impl Kind {
    pub const ALL: [Kind; 6] = [Kind::Project, Kind::Service, Kind::Slo, Kind::Agent, Kind::AlertPolicy, Kind::AlertMethod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Unknown => "Unknown",
            Kind::Project => "Project",
            Kind::Service => "Service",
            Kind::Slo => "SLO",
            Kind::Agent => "Agent",
            Kind::AlertPolicy => "AlertPolicy",
            Kind::AlertMethod => "AlertMethod",
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Kind::Unknown
    }

    pub fn names() -> Vec<&'static str> {
        Kind::ALL.iter().map(Kind::as_str).collect()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive.
impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Never fails: anything that is not a known kind name becomes `Unknown`.
impl<'de> Deserialize<'de> for Kind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKind {
            Text(String),
            Other(serde::de::IgnoredAny),
        }
        Ok(match RawKind::deserialize(deserializer)? {
            RawKind::Text(s) => s.parse().unwrap_or_default(),
            RawKind::Other(_) => Kind::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("slo".parse::<Kind>().unwrap(), Kind::Slo);
        assert_eq!("ALERTPOLICY".parse::<Kind>().unwrap(), Kind::AlertPolicy);
        let err = "Dashboard".parse::<Kind>().unwrap_err();
        assert!(err.to_string().starts_with("Dashboard is not a valid Kind, try [Project, Service, SLO"));
    }

    #[test]
    fn lenient_deserialisation() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default)]
            kind: Kind,
        }
        let parse = |s: &str| serde_json::from_str::<Holder>(s).unwrap().kind;
        assert_eq!(parse(r#"{"kind":"Service"}"#), Kind::Service);
        assert_eq!(parse(r#"{"kind":""}"#), Kind::Unknown);
        assert_eq!(parse(r#"{"kind":"Nope"}"#), Kind::Unknown);
        assert_eq!(parse(r#"{"kind":42}"#), Kind::Unknown);
        assert_eq!(parse(r#"{"kind":null}"#), Kind::Unknown);
        assert_eq!(parse("{}"), Kind::Unknown);
        let yaml: Holder = serde_yaml::from_str("kind: [a, b]").unwrap();
        assert_eq!(yaml.kind, Kind::Unknown);
    }
}

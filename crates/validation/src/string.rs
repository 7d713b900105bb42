use once_cell::sync::Lazy;
use regex::Regex;

use crate::codes;
use crate::errors::RuleError;
use crate::length::string_length;
use crate::rule::{RuleSet, SingleRule};

static DNS_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap());
static UUID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap());
static ASCII: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\x00-\x7F]*$").unwrap());

fn quoted(items: &[&str]) -> String {
    items.iter().map(|i| format!("'{i}'")).collect::<Vec<_>>().join(", ")
}

pub fn string_not_empty() -> SingleRule<String> {
    SingleRule::new(|v: &String| {
        if v.trim().is_empty() {
            Err("string cannot be empty".into())
        } else {
            Ok(())
        }
    })
    .with_error_code(codes::STRING_NOT_EMPTY)
    .with_description("string cannot be empty")
}

fn regexp_message(verb: &str, re: &Regex, examples: &[&str]) -> String {
    let mut msg = format!("string {verb} regular expression: '{re}'");
    if !examples.is_empty() {
        msg.push_str(&format!(" (e.g. {})", quoted(examples)));
    }
    msg
}

pub fn string_match_regexp(re: Regex, examples: &[&str]) -> SingleRule<String> {
    let message = regexp_message("must match", &re, examples);
    let description = message.clone();
    SingleRule::new(move |v: &String| {
        if re.is_match(v) {
            Ok(())
        } else {
            Err(RuleError::new(message.clone()))
        }
    })
    .with_error_code(codes::STRING_MATCH_REGEXP)
    .with_description(description)
}

pub fn string_deny_regexp(re: Regex, examples: &[&str]) -> SingleRule<String> {
    let message = regexp_message("must not match", &re, examples);
    let description = message.clone();
    SingleRule::new(move |v: &String| {
        if re.is_match(v) {
            Err(RuleError::new(message.clone()))
        } else {
            Ok(())
        }
    })
    .with_error_code(codes::STRING_DENY_REGEXP)
    .with_description(description)
}

/// RFC-1123 label: 1..63 characters of lower case alphanumerics or `-`.
pub fn string_is_dns_subdomain() -> RuleSet<String> {
    RuleSet::new()
        .rule(string_length(1, 63))
        .rule(string_match_regexp(DNS_SUBDOMAIN.clone(), &["my-name", "123-abc"]).with_details(
            "an RFC-1123 compliant label name must consist of lower case alphanumeric characters or '-', \
             and must start and end with an alphanumeric character",
        ))
        .with_error_code(codes::STRING_IS_DNS_SUBDOMAIN)
}

pub fn string_uuid() -> SingleRule<String> {
    string_match_regexp(UUID.clone(), &["00000000-0000-0000-0000-000000000000"])
        .with_details("expected RFC-4122 compliant UUID string")
        .with_error_code(codes::STRING_UUID)
}

pub fn string_ascii() -> SingleRule<String> {
    string_match_regexp(ASCII.clone(), &[]).with_error_code(codes::STRING_ASCII)
}

pub fn string_description() -> SingleRule<String> {
    string_length(0, 1050).with_error_code(codes::STRING_DESCRIPTION)
}

/// Absolute URL with a scheme and a host.
pub fn string_url() -> SingleRule<String> {
    SingleRule::new(|v: &String| {
        let parsed = url::Url::parse(v).map_err(|e| RuleError::new(format!("failed to parse URL: {e}")))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err("valid URL must have a scheme (e.g. https://) and contain a host".into());
        }
        Ok(())
    })
    .with_error_code(codes::STRING_URL)
    .with_description("string must be a valid URL")
}

pub fn string_json() -> SingleRule<String> {
    SingleRule::new(|v: &String| match serde_json::from_str::<serde::de::IgnoredAny>(v) {
        Ok(_) => Ok(()),
        Err(_) => Err("string must be a valid JSON".into()),
    })
    .with_error_code(codes::STRING_JSON)
    .with_description("string must be a valid JSON")
}

pub fn string_contains(substrings: &[&str]) -> SingleRule<String> {
    let wanted: Vec<String> = substrings.iter().map(|s| s.to_string()).collect();
    let message = format!("string must contain the following substrings: {}", quoted(substrings));
    let description = message.clone();
    SingleRule::new(move |v: &String| {
        if wanted.iter().all(|s| v.contains(s.as_str())) {
            Ok(())
        } else {
            Err(RuleError::new(message.clone()))
        }
    })
    .with_error_code(codes::STRING_CONTAINS)
    .with_description(description)
}

pub fn string_starts_with(prefixes: &[&str]) -> SingleRule<String> {
    let wanted: Vec<String> = prefixes.iter().map(|s| s.to_string()).collect();
    let message = if prefixes.len() == 1 {
        format!("string must start with {} prefix", quoted(prefixes))
    } else {
        format!("string must start with one of the following prefixes: {}", quoted(prefixes))
    };
    let description = message.clone();
    SingleRule::new(move |v: &String| {
        if wanted.iter().any(|p| v.starts_with(p.as_str())) {
            Ok(())
        } else {
            Err(RuleError::new(message.clone()))
        }
    })
    .with_error_code(codes::STRING_STARTS_WITH)
    .with_description(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HasErrorCode;
    use crate::rule::Rule;

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn dns_subdomain() {
        let rule = string_is_dns_subdomain();
        assert!(rule.validate(&s("my-project")).is_ok());
        let err = rule.validate(&s("My Project")).unwrap_err();
        assert!(err.has_error_code(codes::STRING_IS_DNS_SUBDOMAIN));
        assert!(err.has_error_code(codes::STRING_MATCH_REGEXP));
        assert!(err.to_string().starts_with("string must match regular expression: '^[a-z0-9]([-a-z0-9]*[a-z0-9])?$'"));
        assert!(err.to_string().contains("; an RFC-1123 compliant label name"));

        let too_long = "a".repeat(64);
        assert!(rule.validate(&too_long).unwrap_err().has_error_code(codes::STRING_LENGTH));
        assert!(rule.validate(&s("")).is_err());
    }

    #[test]
    fn misc_string_rules() {
        assert!(string_not_empty().validate(&s("  ")).is_err());
        assert!(string_uuid().validate(&s("7f3c8b2e-1a4d-4c5e-9f60-0a1b2c3d4e5f")).is_ok());
        assert!(string_uuid().validate(&s("nope")).unwrap_err().has_error_code(codes::STRING_UUID));
        assert!(string_ascii().validate(&s("zażółć")).is_err());
        assert!(string_description().validate(&"x".repeat(1051)).unwrap_err().has_error_code(codes::STRING_DESCRIPTION));
        assert!(string_url().validate(&s("https://example.com/path")).is_ok());
        assert!(string_url().validate(&s("example.com")).is_err());
        assert!(string_json().validate(&s(r#"{"a": [1, 2]}"#)).is_ok());
        assert!(string_json().validate(&s("{")).is_err());
        assert!(string_contains(&["a", "b"]).validate(&s("cab")).is_ok());
        assert_eq!(
            string_starts_with(&["http"]).validate(&s("ftp://x")).unwrap_err().to_string(),
            "string must start with 'http' prefix"
        );
        assert!(string_deny_regexp(Regex::new("^x").unwrap(), &[]).validate(&s("xyz")).is_err());
    }
}

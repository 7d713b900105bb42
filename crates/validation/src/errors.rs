//! Error layers produced by the engine: [`RuleError`] (one failed rule),
//! [`PropertyError`] (all failures of one property path) and
//! [`ValidatorError`] (all property failures of one validated value).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codes;

/// Chain of rule identifiers, joined with [`codes::SEPARATOR`].
pub type ErrorCode = String;

const LIST_POINT: &str = "- ";
const HIDDEN_VALUE: &str = "[hidden]";
const VALUE_LIMIT: usize = 100;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleError {
    #[serde(rename = "error")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: ErrorCode,
}

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), code: ErrorCode::new() }
    }

    pub fn with_code(message: impl Into<String>, code: &str) -> Self {
        Self { message: message.into(), code: code.to_string() }
    }

    pub fn required() -> Self {
        Self::with_code("property is required but was empty", codes::REQUIRED)
    }

    /// Prepends `code` to the existing chain.
    pub fn add_code(mut self, code: &str) -> Self {
        self.code = concat_non_empty(code, &self.code, codes::SEPARATOR);
        self
    }

    /// Replaces every occurrence of `value` in the message with a placeholder.
    pub fn hide_value(mut self, value: &str) -> Self {
        if !value.is_empty() {
            self.message = self.message.replace(value, HIDDEN_VALUE);
        }
        self
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.split(codes::SEPARATOR).any(|c| c == code)
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuleError {}

impl From<&str> for RuleError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for RuleError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// All rule failures recorded for one property path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyError {
    #[serde(default)]
    pub property_name: String,
    #[serde(default)]
    pub property_value: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_key_error: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_slice_element_error: bool,
    #[serde(default)]
    pub errors: Vec<RuleError>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl PropertyError {
    pub fn new(name: impl Into<String>, value: impl Into<String>, errors: Vec<RuleError>) -> Self {
        Self {
            property_name: name.into(),
            property_value: value.into(),
            is_key_error: false,
            is_slice_element_error: false,
            errors,
        }
    }

    /// Prefixes the path with `name`. Slice element paths (`[0].x`) attach
    /// without a dot.
    pub fn prepend_property_name(mut self, name: &str) -> Self {
        let sep = if self.is_slice_element_error && self.property_name.starts_with('[') { "" } else { "." };
        self.property_name = concat_non_empty(name, &self.property_name, sep);
        self
    }

    /// Drops the rendered value and masks it inside every message.
    pub fn hide_value(mut self) -> Self {
        let value = std::mem::take(&mut self.property_value);
        self.errors = self.errors.into_iter().map(|e| e.hide_value(&value)).collect();
        self
    }

    pub(crate) fn same_property(&self, other: &PropertyError) -> bool {
        self.property_name == other.property_name
            && self.property_value == other.property_value
            && self.is_key_error == other.is_key_error
            && self.is_slice_element_error == other.is_slice_element_error
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b = String::new();
        let mut indent = "";
        if !self.property_name.is_empty() {
            b.push_str(&format!("'{}'", self.property_name));
            if !self.property_value.is_empty() {
                let label = if self.is_key_error { "key" } else { "value" };
                b.push_str(&format!(" with {label} '{}'", self.property_value));
            }
            b.push_str(":\n");
            indent = "  ";
        }
        join_errors(&mut b, &self.errors, indent);
        f.write_str(&b)
    }
}

impl std::error::Error for PropertyError {}

/// Result of running a [`crate::Validator`] that found problems.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidatorError {
    pub errors: Vec<PropertyError>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl ValidatorError {
    pub fn new(errors: Vec<PropertyError>) -> Self {
        Self { errors, name: String::new() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Display for ValidatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b = String::from("Validation");
        if !self.name.is_empty() {
            b.push_str(&format!(" for {}", self.name));
        }
        b.push_str(" has failed for the following properties:\n");
        join_errors(&mut b, &self.errors, "  ");
        f.write_str(&b)
    }
}

impl std::error::Error for ValidatorError {}

/// What a [`crate::Rule`] reports on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    Rule(RuleError),
    /// Nested property failure, e.g. from a rule that inspects sub-fields.
    Property(PropertyError),
    Set(Vec<RuleViolation>),
}

impl RuleViolation {
    pub fn add_code(self, code: &str) -> Self {
        if code.is_empty() {
            return self;
        }
        match self {
            RuleViolation::Rule(e) => RuleViolation::Rule(e.add_code(code)),
            RuleViolation::Property(mut p) => {
                p.errors = p.errors.into_iter().map(|e| e.add_code(code)).collect();
                RuleViolation::Property(p)
            }
            RuleViolation::Set(v) => RuleViolation::Set(v.into_iter().map(|e| e.add_code(code)).collect()),
        }
    }

    /// Appends `details` to every plain rule message.
    pub fn add_details(self, details: &str) -> Self {
        if details.is_empty() {
            return self;
        }
        match self {
            RuleViolation::Rule(mut e) => {
                e.message = add_details(&e.message, details);
                RuleViolation::Rule(e)
            }
            RuleViolation::Set(v) => RuleViolation::Set(v.into_iter().map(|e| e.add_details(details)).collect()),
            other => other,
        }
    }

    /// Splits into failures of the property itself and nested property
    /// failures (already prefixed with `name`).
    pub(crate) fn collect_into(self, name: &str, rules: &mut Vec<RuleError>, props: &mut Vec<PropertyError>) {
        match self {
            RuleViolation::Rule(e) => rules.push(e),
            RuleViolation::Property(p) => props.push(p.prepend_property_name(name)),
            RuleViolation::Set(v) => v.into_iter().for_each(|e| e.collect_into(name, rules, props)),
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::Rule(e) => e.fmt(f),
            RuleViolation::Property(p) => p.fmt(f),
            RuleViolation::Set(v) => {
                let mut b = String::new();
                join_errors(&mut b, v, "");
                f.write_str(&b)
            }
        }
    }
}

impl std::error::Error for RuleViolation {}

impl From<RuleError> for RuleViolation {
    fn from(e: RuleError) -> Self {
        RuleViolation::Rule(e)
    }
}

impl From<PropertyError> for RuleViolation {
    fn from(e: PropertyError) -> Self {
        RuleViolation::Property(e)
    }
}

/// Lookup of an error code anywhere inside an error layer.
pub trait HasErrorCode {
    fn has_error_code(&self, code: &str) -> bool;
}

impl HasErrorCode for RuleError {
    fn has_error_code(&self, code: &str) -> bool {
        self.has_code(code)
    }
}

impl HasErrorCode for PropertyError {
    fn has_error_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.has_code(code))
    }
}

impl HasErrorCode for [PropertyError] {
    fn has_error_code(&self, code: &str) -> bool {
        self.iter().any(|e| e.has_error_code(code))
    }
}

impl HasErrorCode for ValidatorError {
    fn has_error_code(&self, code: &str) -> bool {
        self.errors.has_error_code(code)
    }
}

impl HasErrorCode for RuleViolation {
    fn has_error_code(&self, code: &str) -> bool {
        match self {
            RuleViolation::Rule(e) => e.has_code(code),
            RuleViolation::Property(p) => p.has_error_code(code),
            RuleViolation::Set(v) => v.iter().any(|e| e.has_error_code(code)),
        }
    }
}

/// Free-function form of [`HasErrorCode::has_error_code`].
pub fn has_error_code<E: HasErrorCode + ?Sized>(err: &E, code: &str) -> bool {
    err.has_error_code(code)
}

/// Renders errors as a `- ` list; multi-line messages keep the indent.
pub fn join_errors<E: fmt::Display>(b: &mut String, errs: &[E], indent: &str) {
    for (i, err) in errs.iter().enumerate() {
        let msg = err.to_string();
        b.push_str(indent);
        if !msg.starts_with(LIST_POINT) {
            b.push_str(LIST_POINT);
        }
        b.push_str(&msg.replace('\n', &format!("\n{indent}")));
        if i + 1 < errs.len() {
            b.push('\n');
        }
    }
}

/// Textual form of a property value as shown in errors: scalars as text,
/// containers as compact JSON, empty values as an empty string.
pub fn property_value_string<T: Serialize + ?Sized>(v: &T) -> String {
    let s = match serde_json::to_value(v) {
        Err(_) | Ok(Value::Null) => return String::new(),
        Ok(Value::String(s)) => s,
        Ok(Value::Array(a)) if a.is_empty() => return String::new(),
        Ok(Value::Object(o)) if o.is_empty() => return String::new(),
        Ok(other) => other.to_string(),
    };
    limit_string(&s, VALUE_LIMIT).trim().replace('\n', "\\n")
}

fn limit_string(s: &str, limit: usize) -> String {
    if s.chars().count() > limit {
        let mut out: String = s.chars().take(limit).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

pub(crate) fn add_details(message: &str, details: &str) -> String {
    match (message.is_empty(), details.is_empty()) {
        (_, true) => message.to_string(),
        (true, false) => details.to_string(),
        (false, false) => format!("{message}; {details}"),
    }
}

pub(crate) fn concat_non_empty(pre: &str, post: &str, sep: &str) -> String {
    match (pre.is_empty(), post.is_empty()) {
        (true, _) => post.to_string(),
        (false, true) => pre.to_string(),
        (false, false) => format!("{pre}{sep}{post}"),
    }
}

/// Merges errors for the same property (first occurrence keeps its place).
pub(crate) fn aggregate(errs: Vec<PropertyError>) -> Vec<PropertyError> {
    let mut out: Vec<PropertyError> = Vec::with_capacity(errs.len());
    for err in errs {
        match out.iter_mut().find(|e| e.same_property(&err)) {
            Some(existing) => existing.errors.extend(err.errors),
            None => out.push(err),
        }
    }
    out
}

pub(crate) fn sort_errors(errs: &mut [PropertyError]) {
    errs.sort_by(|a, b| {
        a.property_name
            .cmp(&b.property_name)
            .then_with(|| a.property_value.cmp(&b.property_value))
            .then_with(|| b.is_key_error.cmp(&a.is_key_error))
            .then_with(|| b.is_slice_element_error.cmp(&a.is_slice_element_error))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_codes_are_prepended() {
        let err = RuleError::with_code("boom", codes::STRING_LENGTH).add_code(codes::STRING_IS_DNS_SUBDOMAIN);
        assert_eq!(err.code, "string_is_dns_subdomain:string_length");
        assert!(err.has_code(codes::STRING_LENGTH));
        assert!(!err.has_code("string"));
        assert_eq!(RuleError::new("x").add_code("").code, "");
    }

    #[test]
    fn property_error_display() {
        let err = PropertyError::new(
            "metadata.name",
            "My Name",
            vec![RuleError::new("first"), RuleError::new("second\nline")],
        );
        assert_eq!(err.to_string(), "'metadata.name' with value 'My Name':\n  - first\n  - second\n  line");

        let mut key = PropertyError::new("labels.A", "A", vec![RuleError::new("bad")]);
        key.is_key_error = true;
        assert_eq!(key.to_string(), "'labels.A' with key 'A':\n  - bad");

        let anonymous = PropertyError::new("", "", vec![RuleError::new("bad")]);
        assert_eq!(anonymous.to_string(), "- bad");
    }

    #[test]
    fn validator_error_display() {
        let err = ValidatorError::new(vec![
            PropertyError::new("a", "1", vec![RuleError::new("x")]),
            PropertyError::new("b", "", vec![RuleError::new("y")]),
        ])
        .with_name("Tutor");
        assert_eq!(
            err.to_string(),
            "Validation for Tutor has failed for the following properties:\n  - 'a' with value '1':\n    - x\n  - 'b':\n    - y"
        );
    }

    #[test]
    fn prepend_names() {
        let mut el = PropertyError::new("[2]", "", vec![]);
        el.is_slice_element_error = true;
        assert_eq!(el.prepend_property_name("items").property_name, "items[2]");
        let nested = PropertyError::new("name", "", vec![]).prepend_property_name("metadata");
        assert_eq!(nested.property_name, "metadata.name");
        assert_eq!(PropertyError::new("", "", vec![]).prepend_property_name("spec").property_name, "spec");
    }

    #[test]
    fn hidden_values_are_masked() {
        let err = PropertyError::new("secret", "s3cr3t", vec![RuleError::new("'s3cr3t' is too short")]).hide_value();
        assert_eq!(err.property_value, "");
        assert_eq!(err.errors[0].message, "'[hidden]' is too short");
    }

    #[test]
    fn value_rendering() {
        assert_eq!(property_value_string("  padded \n"), "padded");
        assert_eq!(property_value_string("two\nlines"), "two\\nlines");
        assert_eq!(property_value_string(&3.5f64), "3.5");
        assert_eq!(property_value_string(&Vec::<String>::new()), "");
        assert_eq!(property_value_string(&Option::<u8>::None), "");
        assert_eq!(property_value_string(&vec!["a", "b"]), r#"["a","b"]"#);
        let long = "x".repeat(150);
        let rendered = property_value_string(&long);
        assert_eq!(rendered.len(), 103);
        assert!(rendered.ends_with("..."));
    }

    #[test]
    fn aggregate_merges_same_property() {
        let merged = aggregate(vec![
            PropertyError::new("a", "1", vec![RuleError::new("x")]),
            PropertyError::new("b", "", vec![RuleError::new("y")]),
            PropertyError::new("a", "1", vec![RuleError::new("z")]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].errors.len(), 2);
        assert_eq!(merged[1].property_name, "b");
    }

    #[test]
    fn json_round_trip() {
        let mut err = PropertyError::new("spec.items[0]", "v", vec![RuleError::with_code("bad", "one_of")]);
        err.is_slice_element_error = true;
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""isSliceElementError":true"#));
        assert!(!json.contains("isKeyError"));
        assert!(json.contains(r#""error":"bad""#));
        let back: PropertyError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn violations_report_codes_at_every_layer() {
        let v = RuleViolation::Set(vec![
            RuleError::new("a").into(),
            PropertyError::new("x", "", vec![RuleError::new("b")]).into(),
        ])
        .add_code("outer");
        assert!(has_error_code(&v, "outer"));
        let validator = ValidatorError::new(vec![PropertyError::new("x", "", vec![RuleError::required()])]);
        assert!(has_error_code(&validator, codes::REQUIRED));
        assert!(!has_error_code(&validator, codes::ONE_OF));
    }
}

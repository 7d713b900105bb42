//! n9 validation engine
//!
//! Declarative rules over typed values. A [`Validator`] holds property rules
//! built with [`for_field`], [`for_option`], [`transform`], [`for_slice`] and
//! [`for_map`]; running it yields a [`ValidatorError`] whose
//! [`PropertyError`]s carry dotted paths (`spec.items[0].name`) and coded
//! [`RuleError`]s.

#![forbid(unsafe_code)]

pub mod codes;
mod comparable;
mod duration;
mod errors;
mod length;
mod map;
mod one_of;
mod plan;
mod property;
mod rule;
mod slice;
mod string;
mod unique;
mod validator;

pub use comparable::{equal_to, greater_than, greater_than_or_equal_to, less_than, less_than_or_equal_to, not_equal_to};
pub use duration::{duration_precision, Duration, ParseDurationError};
pub use errors::{
    has_error_code, join_errors, property_value_string, ErrorCode, HasErrorCode, PropertyError, RuleError,
    RuleViolation, ValidatorError,
};
pub use length::{
    map_length, map_max_length, map_min_length, slice_length, slice_max_length, slice_min_length, string_length,
    string_max_length, string_min_length,
};
pub use map::{for_map, MapItem, PropertyRulesForMap};
pub use one_of::{mutually_exclusive, one_of, MutuallyExclusive};
pub use plan::{plan, PlanBuilder, PlanSink, PropertyPlan, RulePlan};
pub use property::{for_field, for_option, get_self, transform, CascadeMode, PropertyRules, PropertyValue};
pub use rule::{Rule, RuleSet, SingleRule};
pub use slice::{for_slice, PropertyRulesForSlice};
pub use string::{
    string_ascii, string_contains, string_deny_regexp, string_description, string_is_dns_subdomain, string_json,
    string_match_regexp, string_not_empty, string_starts_with, string_url, string_uuid,
};
pub use unique::{self_hash, slice_unique};
pub use validator::{PropertyValidator, Validator};

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::codes;
use crate::errors::{aggregate, property_value_string, PropertyError, RuleError};
use crate::plan::{PlanBuilder, PlanSink, RulePlan};
use crate::rule::Rule;
use crate::validator::{PropertyValidator, Validator};

/// Bound shared by every value a property rule can inspect. Emptiness is
/// equality with `Default::default()`.
pub trait PropertyValue: Serialize + Default + PartialEq + 'static {}

impl<T: Serialize + Default + PartialEq + 'static> PropertyValue for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeMode {
    /// Run every step and report all failures.
    #[default]
    Continue,
    /// Stop at the first failing step.
    Stop,
}

pub(crate) struct Predicate<S> {
    check: Arc<dyn Fn(&S) -> bool + Send + Sync>,
    pub(crate) description: String,
}

impl<S> Clone for Predicate<S> {
    fn clone(&self) -> Self {
        Self { check: Arc::clone(&self.check), description: self.description.clone() }
    }
}

impl<S> Predicate<S> {
    pub(crate) fn new<P>(check: P, description: impl Into<String>) -> Self
    where
        P: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self { check: Arc::new(check), description: description.into() }
    }
}

pub(crate) fn matches<S>(predicates: &[Predicate<S>], st: &S) -> bool {
    predicates.iter().all(|p| (p.check)(st))
}

pub(crate) fn conditions<S>(predicates: &[Predicate<S>]) -> Vec<String> {
    predicates.iter().filter(|p| !p.description.is_empty()).map(|p| p.description.clone()).collect()
}

pub(crate) enum Extracted<T> {
    Present(T),
    /// Absent optional or empty transform input; carries the default value.
    Absent(T),
    Failed { original: String, error: RuleError },
}

type Getter<T, S> = Arc<dyn Fn(&S) -> Extracted<T> + Send + Sync>;

enum Step<T> {
    Rule(Arc<dyn Rule<T>>),
    Validator(Validator<T>),
}

impl<T> Clone for Step<T> {
    fn clone(&self) -> Self {
        match self {
            Step::Rule(r) => Step::Rule(Arc::clone(r)),
            Step::Validator(v) => Step::Validator(v.clone()),
        }
    }
}

/// Rules for one property of `S`, extracted as a `T`.
pub struct PropertyRules<T, S> {
    pub(crate) name: String,
    getter: Getter<T, S>,
    steps: Vec<Step<T>>,
    required: bool,
    omit_empty: bool,
    hide_value: bool,
    is_optional: bool,
    mode: CascadeMode,
    examples: Vec<String>,
    predicates: Vec<Predicate<S>>,
}

impl<T, S> Clone for PropertyRules<T, S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            getter: Arc::clone(&self.getter),
            steps: self.steps.clone(),
            required: self.required,
            omit_empty: self.omit_empty,
            hide_value: self.hide_value,
            is_optional: self.is_optional,
            mode: self.mode,
            examples: self.examples.clone(),
            predicates: self.predicates.clone(),
        }
    }
}

/// Rules for a plain field.
pub fn for_field<T, S, F>(getter: F) -> PropertyRules<T, S>
where
    T: PropertyValue,
    S: 'static,
    F: Fn(&S) -> T + Send + Sync + 'static,
{
    PropertyRules::from_getter(Arc::new(move |st: &S| Extracted::Present(getter(st))), false)
}

/// Rules for an optional field. `None` skips the rules unless the property is
/// [required](PropertyRules::required); `Some` is validated even when its
/// content is empty.
pub fn for_option<T, S, F>(getter: F) -> PropertyRules<T, S>
where
    T: PropertyValue,
    S: 'static,
    F: Fn(&S) -> Option<T> + Send + Sync + 'static,
{
    PropertyRules::from_getter(
        Arc::new(move |st: &S| match getter(st) {
            Some(v) => Extracted::Present(v),
            None => Extracted::Absent(T::default()),
        }),
        true,
    )
}

/// Rules over the result of `f` applied to the extracted value. A failing
/// transformation is reported with the original value and the `transform`
/// code; an empty input is treated as an empty property.
pub fn transform<T, N, S, G, F, E>(getter: G, f: F) -> PropertyRules<N, S>
where
    T: PropertyValue,
    N: PropertyValue,
    S: 'static,
    G: Fn(&S) -> T + Send + Sync + 'static,
    F: Fn(&T) -> Result<N, E> + Send + Sync + 'static,
    E: fmt::Display + 'static,
{
    PropertyRules::from_getter(
        Arc::new(move |st: &S| {
            let v = getter(st);
            if v == T::default() {
                return Extracted::Absent(N::default());
            }
            match f(&v) {
                Ok(n) => Extracted::Present(n),
                Err(e) => Extracted::Failed {
                    original: property_value_string(&v),
                    error: RuleError::with_code(e.to_string(), codes::TRANSFORM),
                },
            }
        }),
        false,
    )
}

/// Getter returning the validated value itself.
pub fn get_self<S: Clone>() -> impl Fn(&S) -> S + Send + Sync + Clone {
    |st: &S| st.clone()
}

impl<T: PropertyValue, S: 'static> PropertyRules<T, S> {
    fn from_getter(getter: Getter<T, S>, is_optional: bool) -> Self {
        Self {
            name: String::new(),
            getter,
            steps: Vec::new(),
            required: false,
            omit_empty: false,
            hide_value: false,
            is_optional,
            mode: CascadeMode::Continue,
            examples: Vec::new(),
            predicates: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_examples(mut self, examples: &[&str]) -> Self {
        self.examples.extend(examples.iter().map(|e| e.to_string()));
        self
    }

    pub fn rule<R: Rule<T> + 'static>(mut self, rule: R) -> Self {
        self.steps.push(Step::Rule(Arc::new(rule)));
        self
    }

    /// Runs a nested validator; its property paths are prefixed with this
    /// property's name.
    pub fn include(mut self, validator: Validator<T>) -> Self {
        self.steps.push(Step::Validator(validator));
        self
    }

    /// Skips the property entirely unless `predicate` holds for the parent.
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Predicate::new(predicate, ""));
        self
    }

    pub fn when_described<P>(mut self, predicate: P, description: impl Into<String>) -> Self
    where
        P: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Predicate::new(predicate, description));
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Skips the rules when the value is empty.
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    pub fn hide_value(mut self) -> Self {
        self.hide_value = true;
        self
    }

    pub fn cascade(mut self, mode: CascadeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn stop_on_error(self) -> Self {
        self.cascade(CascadeMode::Stop)
    }

    /// `Ok(None)` means the rules must not run.
    fn value(&self, st: &S) -> Result<Option<T>, PropertyError> {
        let (v, empty) = match (self.getter)(st) {
            Extracted::Present(v) => {
                let empty = !self.is_optional && v == T::default();
                (v, empty)
            }
            Extracted::Absent(v) => (v, true),
            Extracted::Failed { original, error } => {
                return Err(PropertyError::new(&self.name, original, vec![error]));
            }
        };
        if !empty {
            return Ok(Some(v));
        }
        if self.required {
            return Err(PropertyError::new(&self.name, "", vec![RuleError::required()]));
        }
        if self.omit_empty || self.is_optional {
            return Ok(None);
        }
        Ok(Some(v))
    }
}

impl<T: PropertyValue, S: 'static> PropertyValidator<S> for PropertyRules<T, S> {
    fn validate(&self, st: &S) -> Vec<PropertyError> {
        if !matches(&self.predicates, st) {
            return Vec::new();
        }
        let value = match self.value(st) {
            Ok(Some(v)) => v,
            Ok(None) => return Vec::new(),
            Err(err) => return vec![if self.hide_value { err.hide_value() } else { err }],
        };

        let mut rule_errors = Vec::new();
        let mut all = Vec::new();
        for step in &self.steps {
            let failed = match step {
                Step::Rule(rule) => match rule.validate(&value) {
                    Ok(()) => false,
                    Err(violation) => {
                        violation.collect_into(&self.name, &mut rule_errors, &mut all);
                        true
                    }
                },
                Step::Validator(validator) => match validator.validate(&value) {
                    Ok(()) => false,
                    Err(err) => {
                        all.extend(err.errors.into_iter().map(|e| e.prepend_property_name(&self.name)));
                        true
                    }
                },
            };
            if failed && self.mode == CascadeMode::Stop {
                break;
            }
        }
        if !rule_errors.is_empty() {
            all.push(PropertyError::new(&self.name, property_value_string(&value), rule_errors));
        }
        if self.hide_value {
            all = all.into_iter().map(PropertyError::hide_value).collect();
        }
        aggregate(all)
    }

    fn plan(&self, builder: &PlanBuilder, sink: &mut PlanSink) {
        let b = builder
            .child(&self.name)
            .with_conditions(conditions(&self.predicates))
            .with_property::<T>(self.is_optional || self.omit_empty, self.hide_value, &self.examples);
        if self.required {
            sink.record(&b, vec![RulePlan::required()]);
        } else {
            sink.record(&b, Vec::new());
        }
        for step in &self.steps {
            match step {
                Step::Rule(rule) => sink.record(&b, rule.plan()),
                Step::Validator(validator) => validator.plan_into(&b, sink),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HasErrorCode;
    use crate::rule::SingleRule;

    #[derive(Clone, Default, PartialEq, Serialize)]
    struct Owner {
        name: String,
        nickname: Option<String>,
        age: String,
    }

    fn fail(msg: &'static str) -> SingleRule<String> {
        SingleRule::new(move |_: &String| Err(msg.into()))
    }

    #[test]
    fn required_empty_field() {
        let rules = for_field(|o: &Owner| o.name.clone()).with_name("name").required().rule(fail("never"));
        let errs = rules.validate(&Owner::default());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].property_name, "name");
        assert!(errs[0].has_error_code(codes::REQUIRED));
        assert_eq!(errs[0].errors[0].message, "property is required but was empty");
    }

    #[test]
    fn empty_field_without_omit_runs_rules() {
        let rules = for_field(|o: &Owner| o.name.clone()).with_name("name").rule(fail("bad"));
        assert_eq!(rules.validate(&Owner::default()).len(), 1);
        let omitted = rules.omit_empty();
        assert!(omitted.validate(&Owner::default()).is_empty());
    }

    #[test]
    fn option_absent_and_present() {
        let rules = for_option(|o: &Owner| o.nickname.clone()).with_name("nickname").rule(fail("bad"));
        assert!(rules.validate(&Owner::default()).is_empty());
        let present = Owner { nickname: Some(String::new()), ..Owner::default() };
        assert_eq!(rules.validate(&present).len(), 1);
        let required = rules.required();
        assert!(required.validate(&Owner::default())[0].has_error_code(codes::REQUIRED));
    }

    #[test]
    fn stop_on_error_halts_steps() {
        let rules = for_field(|o: &Owner| o.name.clone()).with_name("name").rule(fail("one")).rule(fail("two"));
        assert_eq!(rules.validate(&Owner::default())[0].errors.len(), 2);
        let stopped = rules.stop_on_error();
        assert_eq!(stopped.validate(&Owner::default())[0].errors.len(), 1);
    }

    #[test]
    fn predicates_skip_property() {
        let rules = for_field(|o: &Owner| o.name.clone())
            .with_name("name")
            .required()
            .when(|o: &Owner| o.age == "adult");
        assert!(rules.validate(&Owner::default()).is_empty());
        let adult = Owner { age: "adult".into(), ..Owner::default() };
        assert_eq!(rules.validate(&adult).len(), 1);
    }

    #[test]
    fn transform_failure_reports_original_value() {
        let rules = transform(|o: &Owner| o.age.clone(), |s: &String| s.parse::<u32>())
            .with_name("age")
            .rule(SingleRule::new(|v: &u32| if *v >= 18 { Ok(()) } else { Err("too young".into()) }));
        let errs = rules.validate(&Owner { age: "ten".into(), ..Owner::default() });
        assert_eq!(errs[0].property_value, "ten");
        assert!(errs[0].has_error_code(codes::TRANSFORM));

        let errs = rules.validate(&Owner { age: "10".into(), ..Owner::default() });
        assert_eq!(errs[0].property_value, "10");
        assert_eq!(errs[0].errors[0].message, "too young");
    }

    #[test]
    fn hidden_value() {
        let rules = for_field(|o: &Owner| o.name.clone())
            .with_name("name")
            .hide_value()
            .rule(SingleRule::new(|v: &String| Err(format!("'{v}' is wrong").into())));
        let errs = rules.validate(&Owner { name: "secret".into(), ..Owner::default() });
        assert_eq!(errs[0].property_value, "");
        assert_eq!(errs[0].errors[0].message, "'[hidden]' is wrong");
    }
}

use std::sync::Arc;

use crate::errors::{aggregate, PropertyError};
use crate::plan::{PlanBuilder, PlanSink};
use crate::property::{conditions, for_field, get_self, matches, CascadeMode, Predicate, PropertyRules, PropertyValue};
use crate::rule::Rule;
use crate::validator::{PropertyValidator, Validator};

/// Rules for a list property: whole-list rules plus per-element rules.
pub struct PropertyRulesForSlice<T, S> {
    slice_rules: PropertyRules<Vec<T>, Vec<T>>,
    for_each_rules: PropertyRules<T, T>,
    getter: Arc<dyn Fn(&S) -> Vec<T> + Send + Sync>,
    mode: CascadeMode,
    predicates: Vec<Predicate<S>>,
}

pub fn for_slice<T, S, F>(getter: F) -> PropertyRulesForSlice<T, S>
where
    T: PropertyValue + Clone,
    S: 'static,
    F: Fn(&S) -> Vec<T> + Send + Sync + 'static,
{
    PropertyRulesForSlice {
        slice_rules: for_field(get_self()),
        for_each_rules: for_field(get_self()),
        getter: Arc::new(getter),
        mode: CascadeMode::Continue,
        predicates: Vec::new(),
    }
}

fn slice_element_name(name: &str, index: usize) -> String {
    format!("{name}[{index}]")
}

impl<T: PropertyValue + Clone, S: 'static> PropertyRulesForSlice<T, S> {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.slice_rules = self.slice_rules.with_name(name);
        self
    }

    /// Rule over the whole list.
    pub fn rules<R: Rule<Vec<T>> + 'static>(mut self, rule: R) -> Self {
        self.slice_rules = self.slice_rules.rule(rule);
        self
    }

    pub fn rules_for_each<R: Rule<T> + 'static>(mut self, rule: R) -> Self {
        self.for_each_rules = self.for_each_rules.rule(rule);
        self
    }

    pub fn include_for_each(mut self, validator: Validator<T>) -> Self {
        self.for_each_rules = self.for_each_rules.include(validator);
        self
    }

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

    /// With [`CascadeMode::Stop`] a failing list rule suppresses element checks.
    pub fn cascade(mut self, mode: CascadeMode) -> Self {
        self.mode = mode;
        self.slice_rules = self.slice_rules.cascade(mode);
        self.for_each_rules = self.for_each_rules.cascade(mode);
        self
    }

    pub fn stop_on_error(self) -> Self {
        self.cascade(CascadeMode::Stop)
    }
}

impl<T: PropertyValue + Clone, S: 'static> PropertyValidator<S> for PropertyRulesForSlice<T, S> {
    fn validate(&self, st: &S) -> Vec<PropertyError> {
        if !matches(&self.predicates, st) {
            return Vec::new();
        }
        let values = (self.getter)(st);
        let mut errs = self.slice_rules.validate(&values);
        if !errs.is_empty() && self.mode == CascadeMode::Stop {
            return errs;
        }
        for (i, value) in values.iter().enumerate() {
            for mut err in self.for_each_rules.validate(value) {
                err.is_slice_element_error = true;
                errs.push(err.prepend_property_name(&slice_element_name(&self.slice_rules.name, i)));
            }
        }
        aggregate(errs)
    }

    fn plan(&self, builder: &PlanBuilder, sink: &mut PlanSink) {
        let b = builder.clone().with_conditions(conditions(&self.predicates));
        self.slice_rules.plan(&b, sink);
        let element = b.child(&format!("{}[*]", self.slice_rules.name));
        self.for_each_rules.plan(&element, sink);
    }
}

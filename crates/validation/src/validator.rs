use std::sync::Arc;

use crate::errors::{PropertyError, ValidatorError};
use crate::plan::{PlanBuilder, PlanSink};
use crate::property::{conditions, matches, Predicate};

/// Anything that checks (part of) an `S` and reports path-addressed errors.
pub trait PropertyValidator<S>: Send + Sync {
    fn validate(&self, st: &S) -> Vec<PropertyError>;

    fn plan(&self, builder: &PlanBuilder, sink: &mut PlanSink);
}

/// Ordered collection of property validators for `S`.
pub struct Validator<S> {
    props: Vec<Arc<dyn PropertyValidator<S>>>,
    name: String,
    predicates: Vec<Predicate<S>>,
}

impl<S> Clone for Validator<S> {
    fn clone(&self) -> Self {
        Self { props: self.props.clone(), name: self.name.clone(), predicates: self.predicates.clone() }
    }
}

impl<S: 'static> Default for Validator<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> Validator<S> {
    pub fn new() -> Self {
        Self { props: Vec::new(), name: String::new(), predicates: Vec::new() }
    }

    pub fn property<P: PropertyValidator<S> + 'static>(mut self, rules: P) -> Self {
        self.props.push(Arc::new(rules));
        self
    }

    /// Name shown in the [`ValidatorError`] header.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
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

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs every property validator in declaration order.
    pub fn validate(&self, st: &S) -> Result<(), ValidatorError> {
        if !matches(&self.predicates, st) {
            return Ok(());
        }
        let errors: Vec<PropertyError> = self.props.iter().flat_map(|p| p.validate(st)).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidatorError::new(errors).with_name(self.name.clone()))
        }
    }

    pub(crate) fn plan_into(&self, builder: &PlanBuilder, sink: &mut PlanSink) {
        let b = builder.clone().with_conditions(conditions(&self.predicates));
        for prop in &self.props {
            prop.plan(&b, sink);
        }
    }
}

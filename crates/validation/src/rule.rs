use std::sync::Arc;

use crate::errors::{add_details, RuleError, RuleViolation};
use crate::plan::RulePlan;

/// A check over a single value.
pub trait Rule<T>: Send + Sync {
    fn validate(&self, v: &T) -> Result<(), RuleViolation>;

    /// Human readable description(s) used by validation plans.
    fn plan(&self) -> Vec<RulePlan> {
        Vec::new()
    }
}

type RuleFn<T> = Arc<dyn Fn(&T) -> Result<(), RuleError> + Send + Sync>;

/// Rule backed by a closure.
pub struct SingleRule<T> {
    check: RuleFn<T>,
    error_code: String,
    message: String,
    details: String,
    description: String,
}

impl<T> Clone for SingleRule<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
            error_code: self.error_code.clone(),
            message: self.message.clone(),
            details: self.details.clone(),
            description: self.description.clone(),
        }
    }
}

impl<T> SingleRule<T> {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&T) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            error_code: String::new(),
            message: String::new(),
            details: String::new(),
            description: String::new(),
        }
    }

    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = code.to_string();
        self
    }

    /// Replaces whatever message the check produced.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Appended to the message as `message; details`.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<T: 'static> Rule<T> for SingleRule<T> {
    fn validate(&self, v: &T) -> Result<(), RuleViolation> {
        let Err(mut err) = (self.check)(v) else {
            return Ok(());
        };
        if !self.message.is_empty() {
            err.message = self.message.clone();
        }
        err.message = add_details(&err.message, &self.details);
        Err(RuleViolation::Rule(err.add_code(&self.error_code)))
    }

    fn plan(&self) -> Vec<RulePlan> {
        let description = if self.message.is_empty() { self.description.clone() } else { self.message.clone() };
        vec![RulePlan {
            description,
            details: self.details.clone(),
            error_code: self.error_code.clone(),
            conditions: Vec::new(),
        }]
    }
}

/// Group of rules reported together; every member runs and the set
/// contributes its own code and details to each failure.
pub struct RuleSet<T> {
    rules: Vec<Arc<dyn Rule<T>>>,
    error_code: String,
    details: String,
}

impl<T> Clone for RuleSet<T> {
    fn clone(&self) -> Self {
        Self { rules: self.rules.clone(), error_code: self.error_code.clone(), details: self.details.clone() }
    }
}

impl<T: 'static> Default for RuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> RuleSet<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new(), error_code: String::new(), details: String::new() }
    }

    pub fn rule<R: Rule<T> + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = code.to_string();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}

impl<T: 'static> Rule<T> for RuleSet<T> {
    fn validate(&self, v: &T) -> Result<(), RuleViolation> {
        let mut failures: Vec<RuleViolation> = self
            .rules
            .iter()
            .filter_map(|r| r.validate(v).err())
            .map(|e| e.add_details(&self.details).add_code(&self.error_code))
            .collect();
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(RuleViolation::Set(failures)),
        }
    }

    fn plan(&self) -> Vec<RulePlan> {
        self.rules
            .iter()
            .flat_map(|r| r.plan())
            .map(|mut p| {
                p.details = add_details(&p.details, &self.details);
                p.error_code = crate::errors::concat_non_empty(&self.error_code, &p.error_code, crate::codes::SEPARATOR);
                p
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HasErrorCode;

    #[test]
    fn single_rule_message_details_and_code() {
        let rule = SingleRule::new(|v: &i32| if *v > 0 { Ok(()) } else { Err("must be positive".into()) })
            .with_error_code("positive")
            .with_details("counts start at one");
        assert!(rule.validate(&1).is_ok());
        let err = rule.validate(&0).unwrap_err();
        assert_eq!(err, RuleViolation::Rule(RuleError::with_code("must be positive; counts start at one", "positive")));

        let overridden = rule.with_message("nope");
        assert_eq!(overridden.validate(&0).unwrap_err().to_string(), "nope; counts start at one");
    }

    #[test]
    fn rule_set_runs_every_member() {
        let set = RuleSet::new()
            .rule(SingleRule::new(|_: &String| Err("first".into())).with_error_code("a"))
            .rule(SingleRule::new(|_: &String| Ok(())))
            .rule(SingleRule::new(|_: &String| Err("second".into())).with_error_code("b"))
            .with_error_code("set");
        let err = set.validate(&String::new()).unwrap_err();
        let RuleViolation::Set(items) = &err else {
            panic!("expected a set, got {err:?}");
        };
        assert_eq!(items.len(), 2);
        assert!(err.has_error_code("set"));
        assert!(err.has_error_code("a"));
        assert!(err.has_error_code("b"));
        assert_eq!(set.plan().len(), 3);
        assert_eq!(set.plan()[0].error_code, "set:a");
    }
}

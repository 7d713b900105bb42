use std::fmt;
use std::sync::Arc;

use crate::codes;
use crate::errors::{RuleError, RuleViolation};
use crate::plan::RulePlan;
use crate::rule::{Rule, SingleRule};

fn pretty_list<I: IntoIterator<Item = D>, D: fmt::Display>(items: I) -> String {
    let rendered: Vec<String> = items.into_iter().map(|i| i.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

/// Value must equal one of `values`.
pub fn one_of<T, I>(values: I) -> SingleRule<T>
where
    T: PartialEq + fmt::Display + Send + Sync + 'static,
    I: IntoIterator,
    I::Item: Into<T>,
{
    let values: Vec<T> = values.into_iter().map(Into::into).collect();
    let message = format!("must be one of {}", pretty_list(&values));
    let description = message.clone();
    SingleRule::new(move |v: &T| {
        if values.contains(v) {
            Ok(())
        } else {
            Err(RuleError::new(message.clone()))
        }
    })
    .with_error_code(codes::ONE_OF)
    .with_description(description)
}

type IsSet<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// At most one (exactly one when `required`) of the named properties of `S`
/// may be set.
pub struct MutuallyExclusive<S> {
    required: bool,
    properties: Vec<(String, IsSet<S>)>,
}

pub fn mutually_exclusive<S>(required: bool) -> MutuallyExclusive<S> {
    MutuallyExclusive { required, properties: Vec::new() }
}

impl<S> MutuallyExclusive<S> {
    pub fn with<F>(mut self, name: impl Into<String>, is_set: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.properties.push((name.into(), Arc::new(is_set)));
        self.properties.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }
}

impl<S: 'static> Rule<S> for MutuallyExclusive<S> {
    fn validate(&self, v: &S) -> Result<(), RuleViolation> {
        let set: Vec<&str> = self.properties.iter().filter(|(_, is_set)| is_set(v)).map(|(n, _)| n.as_str()).collect();
        match set.len() {
            0 if self.required => Err(RuleError::with_code(
                format!("one of {} properties must be set, none was provided", pretty_list(self.names())),
                codes::MUTUALLY_EXCLUSIVE,
            )
            .into()),
            0 | 1 => Ok(()),
            _ => Err(RuleError::with_code(
                format!("{} properties are mutually exclusive, provide only one of them", pretty_list(set)),
                codes::MUTUALLY_EXCLUSIVE,
            )
            .into()),
        }
    }

    fn plan(&self) -> Vec<RulePlan> {
        let amount = if self.required { "exactly one" } else { "at most one" };
        vec![RulePlan {
            description: format!("{amount} of {} properties must be set", pretty_list(self.names())),
            error_code: codes::MUTUALLY_EXCLUSIVE.to_string(),
            ..RulePlan::default()
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sources {
        http: Option<String>,
        file: Option<String>,
    }

    fn rule(required: bool) -> MutuallyExclusive<Sources> {
        mutually_exclusive(required)
            .with("http", |s: &Sources| s.http.is_some())
            .with("file", |s: &Sources| s.file.is_some())
    }

    #[test]
    fn one_of_lists_allowed_values() {
        let r: SingleRule<String> = one_of(["Low", "Medium", "High"]);
        assert!(r.validate(&"Low".to_string()).is_ok());
        assert_eq!(r.validate(&"Urgent".to_string()).unwrap_err().to_string(), "must be one of [Low, Medium, High]");
    }

    #[test]
    fn mutually_exclusive_properties() {
        assert!(rule(false).validate(&Sources::default()).is_ok());
        assert_eq!(
            rule(true).validate(&Sources::default()).unwrap_err().to_string(),
            "one of [file, http] properties must be set, none was provided"
        );
        let both = Sources { http: Some("a".into()), file: Some("b".into()) };
        assert_eq!(
            rule(false).validate(&both).unwrap_err().to_string(),
            "[file, http] properties are mutually exclusive, provide only one of them"
        );
        let one = Sources { http: Some("a".into()), file: None };
        assert!(rule(true).validate(&one).is_ok());
    }
}

use std::fmt;

use crate::codes;
use crate::errors::RuleError;
use crate::rule::SingleRule;

fn compare<T, F>(compared: T, op: &str, code: &str, accept: F) -> SingleRule<T>
where
    T: fmt::Display + Send + Sync + 'static,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    let message = format!("should be {op} '{compared}'");
    let description = message.clone();
    SingleRule::new(move |v: &T| {
        if accept(v, &compared) {
            Ok(())
        } else {
            Err(RuleError::new(message.clone()))
        }
    })
    .with_error_code(code)
    .with_description(description)
}

pub fn equal_to<T>(compared: T) -> SingleRule<T>
where
    T: PartialEq + fmt::Display + Send + Sync + 'static,
{
    compare(compared, "equal to", codes::EQUAL_TO, |v, c| v == c)
}

pub fn not_equal_to<T>(compared: T) -> SingleRule<T>
where
    T: PartialEq + fmt::Display + Send + Sync + 'static,
{
    compare(compared, "not equal to", codes::NOT_EQUAL_TO, |v, c| v != c)
}

pub fn greater_than<T>(compared: T) -> SingleRule<T>
where
    T: PartialOrd + fmt::Display + Send + Sync + 'static,
{
    compare(compared, "greater than", codes::GREATER_THAN, |v, c| v > c)
}

pub fn greater_than_or_equal_to<T>(compared: T) -> SingleRule<T>
where
    T: PartialOrd + fmt::Display + Send + Sync + 'static,
{
    compare(compared, "greater than or equal to", codes::GREATER_THAN_OR_EQUAL_TO, |v, c| v >= c)
}

pub fn less_than<T>(compared: T) -> SingleRule<T>
where
    T: PartialOrd + fmt::Display + Send + Sync + 'static,
{
    compare(compared, "less than", codes::LESS_THAN, |v, c| v < c)
}

pub fn less_than_or_equal_to<T>(compared: T) -> SingleRule<T>
where
    T: PartialOrd + fmt::Display + Send + Sync + 'static,
{
    compare(compared, "less than or equal to", codes::LESS_THAN_OR_EQUAL_TO, |v, c| v <= c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{HasErrorCode, RuleViolation};
    use crate::rule::Rule;

    #[test]
    fn comparison_messages() {
        let err = greater_than(0.0).validate(&-1.0).unwrap_err();
        assert_eq!(err.to_string(), "should be greater than '0'");
        assert!(err.has_error_code(codes::GREATER_THAN));

        assert!(less_than(1.0).validate(&0.99).is_ok());
        assert!(less_than(1.0).validate(&1.0).is_err());
        assert!(less_than_or_equal_to(1.0).validate(&1.0).is_ok());
        assert!(greater_than_or_equal_to(5).validate(&5).is_ok());
        assert!(equal_to("a".to_string()).validate(&"a".to_string()).is_ok());

        let err = not_equal_to(3).validate(&3).unwrap_err();
        assert_eq!(
            err,
            RuleViolation::Rule(RuleError::with_code("should be not equal to '3'", codes::NOT_EQUAL_TO))
        );
    }
}

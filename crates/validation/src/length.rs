use std::collections::BTreeMap;

use crate::codes;
use crate::errors::RuleError;
use crate::rule::SingleRule;

fn between(min: usize, max: usize) -> String {
    format!("length must be between {min} and {max}")
}

fn at_least(min: usize) -> String {
    format!("length must be greater than or equal to {min}")
}

fn at_most(max: usize) -> String {
    format!("length must be less than or equal to {max}")
}

fn length_rule<T, F, A>(measure: F, accept: A, message: String, code: &str) -> SingleRule<T>
where
    T: 'static,
    F: Fn(&T) -> usize + Send + Sync + 'static,
    A: Fn(usize) -> bool + Send + Sync + 'static,
{
    let description = message.clone();
    SingleRule::new(move |v: &T| {
        if accept(measure(v)) {
            Ok(())
        } else {
            Err(RuleError::new(message.clone()))
        }
    })
    .with_error_code(code)
    .with_description(description)
}

/// Length in characters, not bytes.
pub fn string_length(min: usize, max: usize) -> SingleRule<String> {
    length_rule(|s: &String| s.chars().count(), move |n| (min..=max).contains(&n), between(min, max), codes::STRING_LENGTH)
}

pub fn string_min_length(min: usize) -> SingleRule<String> {
    length_rule(|s: &String| s.chars().count(), move |n| n >= min, at_least(min), codes::STRING_MIN_LENGTH)
}

pub fn string_max_length(max: usize) -> SingleRule<String> {
    length_rule(|s: &String| s.chars().count(), move |n| n <= max, at_most(max), codes::STRING_MAX_LENGTH)
}

pub fn slice_length<T: 'static>(min: usize, max: usize) -> SingleRule<Vec<T>> {
    length_rule(|v: &Vec<T>| v.len(), move |n| (min..=max).contains(&n), between(min, max), codes::SLICE_LENGTH)
}

pub fn slice_min_length<T: 'static>(min: usize) -> SingleRule<Vec<T>> {
    length_rule(|v: &Vec<T>| v.len(), move |n| n >= min, at_least(min), codes::SLICE_MIN_LENGTH)
}

pub fn slice_max_length<T: 'static>(max: usize) -> SingleRule<Vec<T>> {
    length_rule(|v: &Vec<T>| v.len(), move |n| n <= max, at_most(max), codes::SLICE_MAX_LENGTH)
}

pub fn map_length<K: 'static, V: 'static>(min: usize, max: usize) -> SingleRule<BTreeMap<K, V>> {
    length_rule(|m: &BTreeMap<K, V>| m.len(), move |n| (min..=max).contains(&n), between(min, max), codes::MAP_LENGTH)
}

pub fn map_min_length<K: 'static, V: 'static>(min: usize) -> SingleRule<BTreeMap<K, V>> {
    length_rule(|m: &BTreeMap<K, V>| m.len(), move |n| n >= min, at_least(min), codes::MAP_MIN_LENGTH)
}

pub fn map_max_length<K: 'static, V: 'static>(max: usize) -> SingleRule<BTreeMap<K, V>> {
    length_rule(|m: &BTreeMap<K, V>| m.len(), move |n| n <= max, at_most(max), codes::MAP_MAX_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HasErrorCode;
    use crate::rule::Rule;

    #[test]
    fn string_lengths_count_characters() {
        assert!(string_length(1, 3).validate(&"żół".to_string()).is_ok());
        let err = string_length(1, 3).validate(&"abcd".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "length must be between 1 and 3");
        assert!(err.has_error_code(codes::STRING_LENGTH));
        assert!(string_min_length(2).validate(&"a".to_string()).is_err());
        assert!(string_max_length(2).validate(&"ab".to_string()).is_ok());
    }

    #[test]
    fn collection_lengths() {
        assert!(slice_min_length::<u8>(1).validate(&vec![]).is_err());
        assert!(slice_length::<u8>(1, 2).validate(&vec![1, 2]).is_ok());
        assert_eq!(
            slice_max_length::<u8>(1).validate(&vec![1, 2]).unwrap_err().to_string(),
            "length must be less than or equal to 1"
        );
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), 1);
        assert!(map_min_length::<String, i32>(2).validate(&m).is_err());
        assert!(map_length::<String, i32>(0, 1).validate(&m).is_ok());
        assert!(map_max_length::<String, i32>(0).validate(&m).is_err());
    }
}

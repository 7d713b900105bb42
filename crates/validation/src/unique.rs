use std::collections::HashMap;
use std::hash::Hash;

use crate::codes;
use crate::rule::SingleRule;

/// No two elements may produce the same key. `constraints` names what the key
/// is built from and is appended to the message.
pub fn slice_unique<T, H, F>(key: F, constraints: &[&str]) -> SingleRule<Vec<T>>
where
    T: 'static,
    H: Hash + Eq + 'static,
    F: Fn(&T) -> H + Send + Sync + 'static,
{
    let suffix = if constraints.is_empty() {
        String::new()
    } else {
        format!(" based on constraints: {}", constraints.join(", "))
    };
    SingleRule::new(move |v: &Vec<T>| {
        let mut seen: HashMap<H, usize> = HashMap::with_capacity(v.len());
        for (i, el) in v.iter().enumerate() {
            if let Some(j) = seen.insert(key(el), i) {
                return Err(format!("elements are not unique, index {j} collides with index {i}{suffix}").into());
            }
        }
        Ok(())
    })
    .with_error_code(codes::SLICE_UNIQUE)
    .with_description("elements must be unique")
}

/// Key function comparing whole elements.
pub fn self_hash<T: Clone>() -> impl Fn(&T) -> T + Send + Sync {
    |v: &T| v.clone()
}

pub mod format;
pub mod portfolio;
pub mod question;
pub mod record;

use serde_json::Value;

/// Removes every key of a JSON object that is not in `known`.
/// Returns the removed key names, sorted. Non-objects are left untouched.
pub fn retain_known_keys(value: &mut Value, known: &[&str]) -> Vec<String> {
    let Some(map) = value.as_object_mut() else {
        return Vec::new();
    };
    let mut dropped: Vec<String> = map
        .keys()
        .filter(|k| !known.contains(&k.as_str()))
        .cloned()
        .collect();
    dropped.sort();
    for key in &dropped {
        map.remove(key);
    }
    dropped
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_retain_known_keys_filters_object() {
        let mut value = json!({"field": "name", "reason": "why", "question": "q"});
        let dropped = retain_known_keys(&mut value, &["field", "question"]);
        assert_eq!(dropped, vec!["reason".to_string()]);
        assert_eq!(value, json!({"field": "name", "question": "q"}));
    }

    #[test]
    fn test_retain_known_keys_ignores_non_objects() {
        let mut value = json!(["a", "b"]);
        assert!(retain_known_keys(&mut value, &["a"]).is_empty());
        assert_eq!(value, json!(["a", "b"]));
    }
}

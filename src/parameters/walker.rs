// JSON Body Walk
//
// Recursive descent over a decoded JSON object, recording every key as a
// parameter and routing credential-shaped string values.
//
// Example:
//   Input:  {"username": "bob", "meta": {"password": "hunter2"}, "tags": [{"token": "abc"}]}
//   Output: parameters = username, meta, password, tags, token
//           users = bob; passwords = hunter2, abc
//
// Scalar array elements and non-string scalars are not inspected.

use super::classifier::CredentialClassifier;
use crate::models::{Category, Harvest};
use serde_json::{Map, Value};

pub fn walk_json(object: &Map<String, Value>, harvest: &mut Harvest) {
    for (key, value) in object {
        harvest.record(Category::Parameters, key.as_str());
        match value {
            Value::String(s) => CredentialClassifier::inspect(harvest, key, s),
            Value::Object(nested) => walk_json(nested, harvest),
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(nested) = item {
                        walk_json(nested, harvest);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn walk(value: Value) -> Harvest {
        let mut harvest = Harvest::new();
        if let Value::Object(map) = value {
            walk_json(&map, &mut harvest);
        }
        harvest
    }

    #[test]
    fn walk_nested_objects_and_arrays() {
        let harvest = walk(json!({
            "username": "bob",
            "meta": {"password": "hunter2"},
            "tags": [{"token": "abc"}]
        }));
        assert!(harvest.contains(&Category::Users, "bob"));
        assert!(harvest.contains(&Category::Passwords, "hunter2"));
        assert!(harvest.contains(&Category::Passwords, "abc"));
        for key in ["username", "meta", "password", "tags", "token"] {
            assert!(harvest.contains(&Category::Parameters, key), "missing {}", key);
        }
    }

    #[test]
    fn scalar_array_elements_and_numbers_are_skipped() {
        let harvest = walk(json!({
            "password": 1234,
            "user": ["alice", "bob"],
            "nested": [[{"token": "deep"}]]
        }));
        assert!(harvest.values(&Category::Passwords).is_empty());
        assert!(harvest.values(&Category::Users).is_empty());
        assert!(!harvest.contains(&Category::Parameters, "token"));
        assert!(harvest.contains(&Category::Parameters, "nested"));
    }
}

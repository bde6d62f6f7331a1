use std::collections::HashMap;

use thiserror::Error;

use super::Value;

/// One patient case, mapping dot-separated field paths to [`Value`]s.
///
/// Supports nested paths like `"macula.edema_prob"`. The record is supplied
/// by the caller, already schema-validated, and is never mutated by an
/// evaluation.
#[derive(Debug, Clone, Default)]
pub struct CaseRecord {
    data: HashMap<String, CaseValue>,
}

#[derive(Debug, Clone)]
enum CaseValue {
    Leaf(Value),
    Nested(HashMap<String, CaseValue>),
}

/// Error converting external case data into a [`CaseRecord`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaseDataError {
    #[error("case data must be a JSON object at the top level")]
    NotAnObject,

    #[error("unsupported value at '{path}': case fields are bool, number, string, or null")]
    UnsupportedValue { path: String },
}

impl CaseRecord {
    /// Create an empty case record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path. Creates intermediate nested maps as needed.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Insert a value at a dot-separated path (mutable reference version).
    pub fn insert(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        Self::insert_recursive(&mut self.data, &segments, value);
    }

    /// Look up a value by dot-separated path.
    /// Returns `None` if the path does not exist, crosses a leaf, or stops
    /// at a nested map.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('.').collect();
        Self::get_recursive(&self.data, &segments)
    }

    /// Build a case record from already-validated JSON case data.
    ///
    /// Nested objects become nested paths; scalar values map onto [`Value`].
    /// Integral numbers become [`Value::Int`], everything else [`Value::Float`].
    ///
    /// # Errors
    ///
    /// Returns [`CaseDataError`] if the top level is not an object or any
    /// field holds an array (case fields are scalars only).
    pub fn from_json(data: &serde_json::Value) -> Result<Self, CaseDataError> {
        let serde_json::Value::Object(map) = data else {
            return Err(CaseDataError::NotAnObject);
        };
        let mut record = CaseRecord::new();
        Self::collect_json(map, &mut Vec::new(), &mut record)?;
        Ok(record)
    }

    fn collect_json(
        map: &serde_json::Map<String, serde_json::Value>,
        prefix: &mut Vec<String>,
        record: &mut CaseRecord,
    ) -> Result<(), CaseDataError> {
        for (key, value) in map {
            prefix.push(key.clone());
            match value {
                serde_json::Value::Object(nested) => {
                    Self::collect_json(nested, prefix, record)?;
                }
                serde_json::Value::Null => record.insert(&prefix.join("."), Value::Null),
                serde_json::Value::Bool(b) => record.insert(&prefix.join("."), Value::Bool(*b)),
                serde_json::Value::Number(n) => {
                    let v = n
                        .as_i64()
                        .map(Value::Int)
                        .or_else(|| n.as_f64().map(Value::Float))
                        .ok_or_else(|| CaseDataError::UnsupportedValue {
                            path: prefix.join("."),
                        })?;
                    record.insert(&prefix.join("."), v);
                }
                serde_json::Value::String(s) => {
                    record.insert(&prefix.join("."), Value::String(s.clone()));
                }
                serde_json::Value::Array(_) => {
                    return Err(CaseDataError::UnsupportedValue {
                        path: prefix.join("."),
                    });
                }
            }
            prefix.pop();
        }
        Ok(())
    }

    fn insert_recursive(map: &mut HashMap<String, CaseValue>, segments: &[&str], value: Value) {
        match segments {
            [] => {}
            [last] => {
                map.insert((*last).to_owned(), CaseValue::Leaf(value));
            }
            [first, rest @ ..] => {
                let entry = map
                    .entry((*first).to_owned())
                    .or_insert_with(|| CaseValue::Nested(HashMap::new()));
                match entry {
                    CaseValue::Nested(nested) => {
                        Self::insert_recursive(nested, rest, value);
                    }
                    CaseValue::Leaf(_) => {
                        let mut nested = HashMap::new();
                        Self::insert_recursive(&mut nested, rest, value);
                        *entry = CaseValue::Nested(nested);
                    }
                }
            }
        }
    }

    fn get_recursive<'a>(
        map: &'a HashMap<String, CaseValue>,
        segments: &[&str],
    ) -> Option<&'a Value> {
        match segments {
            [] => None,
            [last] => match map.get(*last)? {
                CaseValue::Leaf(v) => Some(v),
                CaseValue::Nested(_) => None,
            },
            [first, rest @ ..] => match map.get(*first)? {
                CaseValue::Nested(nested) => Self::get_recursive(nested, rest),
                CaseValue::Leaf(_) => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_simple() {
        let case = CaseRecord::new().set("dr_grade", "moderate_npdr");
        assert_eq!(
            case.get("dr_grade"),
            Some(&Value::String("moderate_npdr".to_owned()))
        );
    }

    #[test]
    fn set_and_get_nested() {
        let case = CaseRecord::new().set("macula.edema_prob", 0.75_f64);
        assert_eq!(case.get("macula.edema_prob"), Some(&Value::Float(0.75)));
    }

    #[test]
    fn get_missing_returns_none() {
        let case = CaseRecord::new().set("qc.fundus_pass", true);
        assert_eq!(case.get("qc.macula_view"), None);
        assert_eq!(case.get("nonexistent"), None);
    }

    #[test]
    fn get_intermediate_path_returns_none() {
        let case = CaseRecord::new().set("qc.fundus_pass", true);
        assert_eq!(case.get("qc"), None);
    }

    #[test]
    fn get_through_leaf_returns_none() {
        let case = CaseRecord::new().set("age", 65_i64);
        assert_eq!(case.get("age.years"), None);
    }

    #[test]
    fn multiple_nested_fields() {
        let case = CaseRecord::new()
            .set("qc.fundus_pass", true)
            .set("qc.macula_view", false)
            .set("age", 65_i64);

        assert_eq!(case.get("qc.fundus_pass"), Some(&Value::Bool(true)));
        assert_eq!(case.get("qc.macula_view"), Some(&Value::Bool(false)));
        assert_eq!(case.get("age"), Some(&Value::Int(65)));
    }

    #[test]
    fn overwrite_leaf_with_nested() {
        let case = CaseRecord::new()
            .set("qc", "old_value")
            .set("qc.fundus_pass", true);
        assert_eq!(case.get("qc.fundus_pass"), Some(&Value::Bool(true)));
        assert_eq!(case.get("qc"), None);
    }

    #[test]
    fn null_leaf_is_stored() {
        let case = CaseRecord::new().set("dr_grade", Value::Null);
        assert_eq!(case.get("dr_grade"), Some(&Value::Null));
    }

    #[test]
    fn insert_mutable_ref() {
        let mut case = CaseRecord::new();
        case.insert("vision_reduced", Value::Bool(true));
        assert_eq!(case.get("vision_reduced"), Some(&Value::Bool(true)));
    }

    #[test]
    fn empty_record_returns_none() {
        let case = CaseRecord::new();
        assert_eq!(case.get("anything"), None);
    }

    #[test]
    fn from_json_scalars_and_nesting() {
        let data = serde_json::json!({
            "age": 65,
            "vision_reduced": true,
            "dr_grade": "moderate_npdr",
            "qc": {"fundus_pass": true, "macula_view": true},
            "macula": {"edema_prob": 0.75},
            "notes": null
        });
        let case = CaseRecord::from_json(&data).unwrap();
        assert_eq!(case.get("age"), Some(&Value::Int(65)));
        assert_eq!(case.get("vision_reduced"), Some(&Value::Bool(true)));
        assert_eq!(case.get("qc.fundus_pass"), Some(&Value::Bool(true)));
        assert_eq!(case.get("macula.edema_prob"), Some(&Value::Float(0.75)));
        assert_eq!(case.get("notes"), Some(&Value::Null));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let data = serde_json::json!([1, 2, 3]);
        let err = CaseRecord::from_json(&data).unwrap_err();
        assert_eq!(err, CaseDataError::NotAnObject);
    }

    #[test]
    fn from_json_rejects_arrays() {
        let data = serde_json::json!({"labs": {"hba1c": [1, 2]}});
        let err = CaseRecord::from_json(&data).unwrap_err();
        assert_eq!(
            err,
            CaseDataError::UnsupportedValue {
                path: "labs.hba1c".to_owned()
            }
        );
    }
}

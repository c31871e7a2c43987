use serde_yaml::{Mapping, Number, Value as YamlValue};
use serde_json::Value as JsonValue;

/// Convert a JSON value into the YAML value model used for front matter.
///
/// Total over the JSON grammar: integers stay integral when they fit in
/// `i64`/`u64`, everything else numeric becomes a float. Object keys are
/// carried through as strings.
pub fn json_to_yaml(value: &JsonValue) -> YamlValue {
    match value {
        JsonValue::Null => YamlValue::Null,
        JsonValue::Bool(b) => YamlValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlValue::Number(Number::from(i))
            } else if let Some(u) = n.as_u64() {
                YamlValue::Number(Number::from(u))
            } else {
                YamlValue::Number(Number::from(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        JsonValue::String(s) => YamlValue::String(s.clone()),
        JsonValue::Array(items) => YamlValue::Sequence(items.iter().map(json_to_yaml).collect()),
        JsonValue::Object(map) => {
            let mut mapping = Mapping::with_capacity(map.len());
            for (key, val) in map {
                mapping.insert(YamlValue::String(key.clone()), json_to_yaml(val));
            }
            YamlValue::Mapping(mapping)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(json_to_yaml(&json!(null)), YamlValue::Null);
        assert_eq!(json_to_yaml(&json!(true)), YamlValue::Bool(true));
        assert_eq!(json_to_yaml(&json!("hi")), YamlValue::String("hi".into()));
    }

    #[test]
    fn test_integers_stay_integral() {
        let v = json_to_yaml(&json!(42));
        assert!(v.as_i64() == Some(42));
        assert!(v.as_f64().is_some());

        let big = json_to_yaml(&json!(u64::MAX));
        assert_eq!(big.as_u64(), Some(u64::MAX));

        let neg = json_to_yaml(&json!(-7));
        assert_eq!(neg.as_i64(), Some(-7));
    }

    #[test]
    fn test_floats() {
        let v = json_to_yaml(&json!(1.5));
        assert_eq!(v.as_i64(), None);
        assert_eq!(v.as_f64(), Some(1.5));
    }

    #[test]
    fn test_nested_structures() {
        let v = json_to_yaml(&json!({
            "seo": { "title": "Hello", "noindex": false },
            "tags": ["rust", 2, null]
        }));
        let expected: YamlValue = serde_yaml::from_str(
            "seo:\n  title: Hello\n  noindex: false\ntags:\n  - rust\n  - 2\n  - null\n",
        )
        .unwrap();
        assert_eq!(v, expected);
    }
}

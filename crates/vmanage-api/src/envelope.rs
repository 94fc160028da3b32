// Response envelope normalization
//
// List endpoints answer either with a bare JSON array or with an object
// carrying the array under `data`. Callers only ever see the array.

use serde_json::Value;

use crate::client::preview;
use crate::error::Error;

/// Unwrap a list response into its ordered records.
///
/// - `{ "data": [...] }` → the `data` array
/// - `[...]` → unchanged
/// - anything else → [`Error::Shape`]
///
/// Elements are returned exactly as received.
pub fn normalize(response: Value) -> Result<Vec<Value>, Error> {
    match response {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => {
                map.insert("data".into(), other);
                Err(shape_error(&Value::Object(map)))
            }
            None => Err(shape_error(&Value::Object(map))),
        },
        other => Err(shape_error(&other)),
    }
}

/// Lenient variant for secondary lookups: an unexpected shape yields an
/// empty list instead of an error.
pub fn normalize_or_empty(response: Value) -> Vec<Value> {
    normalize(response).unwrap_or_default()
}

fn shape_error(response: &Value) -> Error {
    let rendered = serde_json::to_string(response).unwrap_or_default();
    Error::Shape {
        preview: preview(&rendered).to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn enveloped_list_is_unwrapped_in_order() {
        let records = normalize(json!({
            "header": { "generatedOn": 1 },
            "data": [{ "host-name": "a" }, { "host-name": "b" }, { "host-name": "c" }]
        }))
        .expect("enveloped list");

        assert_eq!(
            records,
            vec![
                json!({ "host-name": "a" }),
                json!({ "host-name": "b" }),
                json!({ "host-name": "c" }),
            ]
        );
    }

    #[test]
    fn bare_list_passes_through() {
        let payload = json!([{ "profileId": "p1", "nested": { "x": [1, 2] } }, { "profileId": "p2" }]);
        let records = normalize(payload.clone()).expect("bare list");
        assert_eq!(Value::Array(records), payload);
    }

    #[test]
    fn empty_lists_are_valid() {
        assert!(normalize(json!([])).expect("bare").is_empty());
        assert!(normalize(json!({ "data": [] })).expect("enveloped").is_empty());
    }

    #[test]
    fn object_without_data_is_a_shape_error() {
        let err = normalize(json!({ "error": "nope" })).unwrap_err();
        match err {
            Error::Shape { preview } => assert!(preview.contains("nope")),
            other => panic!("expected Shape error, got: {other:?}"),
        }
    }

    #[test]
    fn non_list_data_is_a_shape_error() {
        assert!(matches!(
            normalize(json!({ "data": { "id": 1 } })),
            Err(Error::Shape { .. })
        ));
        assert!(matches!(normalize(json!({ "data": null })), Err(Error::Shape { .. })));
    }

    #[test]
    fn scalars_are_shape_errors() {
        for value in [json!(null), json!("text"), json!(42), json!(true)] {
            assert!(matches!(normalize(value), Err(Error::Shape { .. })));
        }
    }

    #[test]
    fn lenient_variant_swallows_shape_errors() {
        assert!(normalize_or_empty(json!("<html>")).is_empty());
        assert_eq!(normalize_or_empty(json!([1, 2])), vec![json!(1), json!(2)]);
    }
}

use serde_json::{json, Map, Value};

/// Properties of a layer written by another tool, without schema metadata.
pub(crate) fn foreign() -> Map<String, Value> {
    let Value::Object(map) = json!({
        "name": "well 1",
        "depth": 12.5,
        "count": 3,
        "active": true,
        "note": null,
    }) else {
        unreachable!()
    };
    map
}

//! Canonicalization of raw schema nodes.
//!
//! Two legacy nullability spellings are folded into one union shape before
//! anything else looks at a schema: multi-valued `type` lists and the
//! `nullable: true` flag. After normalization no node carries either, and
//! normalizing twice is a no-op.

use serde_json::{Map, Value, json};

/// Rewrite every schema-shaped subtree of a JSON-like document into the
/// canonical union form. Malformed or absent fields pass through untouched.
pub fn normalize_document(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            for (_, child) in obj.iter_mut() {
                normalize_document(child);
            }
            normalize_node(obj);
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                normalize_document(item);
            }
        }
        _ => {}
    }
}

/// Rewrite one object node, bottom-up (children are already canonical).
fn normalize_node(obj: &mut Map<String, Value>) {
    rewrite_type_list(obj);
    fold_nullable(obj);
}

/// `type: [T, "null"]` collapses to `type: T`; `type` lists with several
/// non-null members become an `anyOf` union of single-type nodes with the
/// null member dropped.
fn rewrite_type_list(obj: &mut Map<String, Value>) {
    let Some(Value::Array(entries)) = obj.get("type") else {
        return;
    };
    if entries.is_empty() || entries.iter().any(|e| !e.is_string()) {
        return; // malformed, pass through
    }

    let non_null: Vec<String> = entries
        .iter()
        .filter_map(|e| e.as_str())
        .filter(|t| *t != "null")
        .map(str::to_string)
        .collect();

    match non_null.len() {
        0 => {
            obj.insert("type".to_string(), json!("null"));
        }
        1 => {
            obj.insert("type".to_string(), json!(non_null[0]));
        }
        _ => {
            obj.remove("type");
            let branches: Vec<Value> = non_null.iter().map(|t| json!({ "type": t })).collect();
            match obj.get_mut("anyOf") {
                Some(Value::Array(existing)) => existing.extend(branches),
                _ => {
                    obj.insert("anyOf".to_string(), Value::Array(branches));
                }
            }
        }
    }
}

/// `nullable: true` folds into an existing union list, or synthesizes a
/// two-branch union from the single declared type. The flag itself never
/// survives.
fn fold_nullable(obj: &mut Map<String, Value>) {
    let Some(flag) = obj.remove("nullable") else {
        return;
    };
    if flag.as_bool() != Some(true) {
        return;
    }

    for key in ["anyOf", "oneOf"] {
        if let Some(Value::Array(branches)) = obj.get_mut(key) {
            if !branches.iter().any(is_null_branch) {
                branches.push(json!({ "type": "null" }));
            }
            return;
        }
    }

    if let Some(declared) = obj.remove("type") {
        obj.insert(
            "anyOf".to_string(),
            json!([{ "type": declared }, { "type": "null" }]),
        );
    }
}

fn is_null_branch(branch: &Value) -> bool {
    branch.get("type").and_then(Value::as_str) == Some("null")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_single_nullable_type() {
        let mut v = json!({ "type": ["string", "null"] });
        normalize_document(&mut v);
        assert_eq!(v, json!({ "type": "string" }));
    }

    #[test]
    fn test_multi_type_becomes_union() {
        let mut v = json!({ "type": ["string", "integer", "null"] });
        normalize_document(&mut v);
        assert_eq!(
            v,
            json!({ "anyOf": [{ "type": "string" }, { "type": "integer" }] })
        );
    }

    #[test]
    fn test_only_null_type() {
        let mut v = json!({ "type": ["null"] });
        normalize_document(&mut v);
        assert_eq!(v, json!({ "type": "null" }));
    }

    #[test]
    fn test_nullable_flag_synthesizes_union() {
        let mut v = json!({ "type": "string", "nullable": true });
        normalize_document(&mut v);
        assert_eq!(
            v,
            json!({ "anyOf": [{ "type": "string" }, { "type": "null" }] })
        );
    }

    #[test]
    fn test_nullable_flag_folds_into_existing_union() {
        let mut v = json!({
            "nullable": true,
            "anyOf": [{ "type": "string" }, { "type": "integer" }]
        });
        normalize_document(&mut v);
        assert_eq!(
            v,
            json!({
                "anyOf": [
                    { "type": "string" },
                    { "type": "integer" },
                    { "type": "null" }
                ]
            })
        );
    }

    #[test]
    fn test_nullable_flag_does_not_duplicate_null_branch() {
        let mut v = json!({
            "nullable": true,
            "anyOf": [{ "type": "string" }, { "type": "null" }]
        });
        normalize_document(&mut v);
        assert_eq!(
            v,
            json!({ "anyOf": [{ "type": "string" }, { "type": "null" }] })
        );
    }

    #[test]
    fn test_nullable_false_is_dropped() {
        let mut v = json!({ "type": "integer", "nullable": false });
        normalize_document(&mut v);
        assert_eq!(v, json!({ "type": "integer" }));
    }

    #[test]
    fn test_nested_nodes_are_rewritten() {
        let mut v = json!({
            "type": "object",
            "properties": {
                "name": { "type": ["string", "null"] },
                "tags": {
                    "type": "array",
                    "items": { "type": "string", "nullable": true }
                }
            }
        });
        normalize_document(&mut v);
        assert_eq!(
            v,
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "tags": {
                        "type": "array",
                        "items": {
                            "anyOf": [{ "type": "string" }, { "type": "null" }]
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_idempotent() {
        let mut v = json!({
            "type": ["string", "integer", "null"],
            "properties": {
                "a": { "type": "boolean", "nullable": true }
            }
        });
        normalize_document(&mut v);
        let once = v.clone();
        normalize_document(&mut v);
        assert_eq!(v, once);
    }

    #[test]
    fn test_malformed_type_passes_through() {
        let mut v = json!({ "type": 42 });
        normalize_document(&mut v);
        assert_eq!(v, json!({ "type": 42 }));

        let mut v = json!({ "type": [42] });
        normalize_document(&mut v);
        assert_eq!(v, json!({ "type": [42] }));
    }
}

//! Rendering of schema nodes to short display strings.
//!
//! Used everywhere a full schema body would be too verbose for prompting:
//! parameter types, request/response shapes, segment schema listings.
//! References render to the referenced definition's name, never its body.

use serde_json::Value;

/// The last path component of a `$ref` string.
pub fn ref_name(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}

/// Render any schema node to a short human/LLM-readable summary, e.g.
/// `RouteOut`, `array<string>`, `enum(bus, tram)`, `object(3 properties)`,
/// `string | null`, `Base & Extra`.
pub fn summarize_schema(value: &Value) -> String {
    let Value::Object(obj) = value else {
        return "any".to_string();
    };

    if let Some(ref_path) = obj.get("$ref").and_then(Value::as_str) {
        return ref_name(ref_path).to_string();
    }

    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        if !values.is_empty() {
            let rendered: Vec<String> = values.iter().map(render_value).collect();
            return format!("enum({})", rendered.join(", "));
        }
    }

    for key in ["oneOf", "anyOf"] {
        if let Some(branches) = obj.get(key).and_then(Value::as_array) {
            if !branches.is_empty() {
                let rendered: Vec<String> = branches.iter().map(summarize_schema).collect();
                return rendered.join(" | ");
            }
        }
    }

    if let Some(parts) = obj.get("allOf").and_then(Value::as_array) {
        if !parts.is_empty() {
            let rendered: Vec<String> = parts.iter().map(summarize_schema).collect();
            return rendered.join(" & ");
        }
    }

    match obj.get("type").and_then(Value::as_str) {
        Some("array") => {
            let items = obj
                .get("items")
                .map(summarize_schema)
                .unwrap_or_else(|| "any".to_string());
            format!("array<{items}>")
        }
        Some("object") => summarize_object(obj),
        Some(other) => other.to_string(),
        None => {
            if obj.get("properties").is_some() {
                summarize_object(obj)
            } else if let Some(items) = obj.get("items") {
                format!("array<{}>", summarize_schema(items))
            } else {
                "any".to_string()
            }
        }
    }
}

fn summarize_object(obj: &serde_json::Map<String, Value>) -> String {
    match obj.get("properties").and_then(Value::as_object) {
        Some(props) if !props.is_empty() => format!("object({} properties)", props.len()),
        _ => "object".to_string(),
    }
}

/// Render a scalar for enum/default display: strings bare, everything else
/// as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_renders_to_name() {
        let v = json!({ "$ref": "#/components/schemas/RouteOut" });
        assert_eq!(summarize_schema(&v), "RouteOut");
    }

    #[test]
    fn test_primitives() {
        assert_eq!(summarize_schema(&json!({ "type": "string" })), "string");
        assert_eq!(summarize_schema(&json!({ "type": "integer" })), "integer");
        assert_eq!(summarize_schema(&json!({ "type": "null" })), "null");
        assert_eq!(summarize_schema(&json!({})), "any");
    }

    #[test]
    fn test_array_of_ref() {
        let v = json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/StopOut" }
        });
        assert_eq!(summarize_schema(&v), "array<StopOut>");
    }

    #[test]
    fn test_enum() {
        let v = json!({ "type": "string", "enum": ["bus", "tram", "metro"] });
        assert_eq!(summarize_schema(&v), "enum(bus, tram, metro)");
    }

    #[test]
    fn test_object_with_properties() {
        let v = json!({
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "integer" } }
        });
        assert_eq!(summarize_schema(&v), "object(2 properties)");
    }

    #[test]
    fn test_bare_object() {
        assert_eq!(summarize_schema(&json!({ "type": "object" })), "object");
    }

    #[test]
    fn test_union() {
        let v = json!({ "anyOf": [{ "type": "string" }, { "type": "null" }] });
        assert_eq!(summarize_schema(&v), "string | null");
    }

    #[test]
    fn test_intersection() {
        let v = json!({
            "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "$ref": "#/components/schemas/Extra" }
            ]
        });
        assert_eq!(summarize_schema(&v), "Base & Extra");
    }
}

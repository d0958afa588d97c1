//! Transitive schema reachability.
//!
//! Given a set of operations and the full name→definition map, compute the
//! minimal set of named schemas the operations depend on. This is a
//! closure computation on a reference graph, not a lookup: one hop away
//! must be included, two hops away must be included, unrelated must not.

use std::collections::{BTreeSet, VecDeque};

use indexmap::IndexMap;
use serde_json::Value;

use crate::ir::OperationIr;
use crate::ir::summary::ref_name;

/// Compute the set of schema names transitively reachable from any
/// parameter/request/response schema summary attached to the operations.
///
/// Work-queue walk over the name-keyed map; a name enters the result set
/// before it is enqueued, so mutually referential definitions terminate.
/// References to names absent from the map contribute nothing and are not
/// an error.
pub fn schema_closure(
    operations: &[OperationIr],
    schemas: &IndexMap<String, Value>,
) -> BTreeSet<String> {
    let mut closed: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    // Seed: any known name textually present, as a whole word, in a
    // summary string on the given operations.
    for name in schemas.keys() {
        let referenced = operations
            .iter()
            .flat_map(|op| op.schema_summaries())
            .any(|summary| contains_word(summary, name));
        if referenced && closed.insert(name.clone()) {
            queue.push_back(name.clone());
        }
    }

    // Expand: structurally walk each queued definition for nested refs.
    while let Some(name) = queue.pop_front() {
        let Some(definition) = schemas.get(&name) else {
            continue;
        };
        let mut found = Vec::new();
        collect_refs(definition, &mut found);
        for target in found {
            if schemas.contains_key(&target) && closed.insert(target.clone()) {
                queue.push_back(target);
            }
        }
    }

    closed
}

/// Collect the basenames of every `$ref` string inside a definition body.
fn collect_refs(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(ref_path) = obj.get("$ref").and_then(Value::as_str) {
                out.push(ref_name(ref_path).to_string());
            }
            for (_, child) in obj {
                collect_refs(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        _ => {}
    }
}

/// Whole-word containment: `word` occurs in `haystack` with no adjacent
/// identifier character on either side. Case-sensitive; schema names are.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let bytes = haystack.as_bytes();
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let begin = start + pos;
        let end = begin + word.len();
        let before_ok = begin == 0 || !is_ident_byte(bytes[begin - 1]);
        let after_ok = end == bytes.len() || !is_ident_byte(bytes[end]);
        if before_ok && after_ok {
            return true;
        }
        start = begin + 1;
    }
    false
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

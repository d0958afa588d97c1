//! Partitioning of an IR into named, self-contained segments.

use heck::ToTitleCase;
use indexmap::IndexMap;
use serde_json::Value;

use crate::closure::schema_closure;
use crate::ir::{OperationIr, SpecIr};

/// A named subset of the parent IR: member operations plus the transitive
/// closure of the schemas they reference. Segments partition the parent's
/// operation set exactly.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Grouping key: the operation's first tag, or its first non-empty
    /// path component when untagged.
    pub key: String,
    pub title: String,
    /// Filesystem-safe slug, unique across segments.
    pub slug: String,
    /// Relative artifact path for segmented output.
    pub file_path: String,
    pub operations: Vec<OperationIr>,
    pub schemas: IndexMap<String, Value>,
}

impl Segment {
    /// A self-contained sub-IR for this segment, carrying the parent's
    /// metadata and security schemes with only this segment's operations
    /// and closed schema subset.
    pub fn to_spec_ir(&self, parent: &SpecIr) -> SpecIr {
        SpecIr {
            title: format!("{} — {}", parent.title, self.title),
            version: parent.version.clone(),
            servers: parent.servers.clone(),
            security_schemes: parent.security_schemes.clone(),
            operations: self.operations.clone(),
            schemas: self.schemas.clone(),
        }
    }
}

/// Partition the IR's operations into segments, sorted by title.
pub fn segment_spec(ir: &SpecIr) -> Vec<Segment> {
    let mut groups: IndexMap<String, Vec<OperationIr>> = IndexMap::new();
    for op in &ir.operations {
        groups.entry(group_key(op)).or_default().push(op.clone());
    }

    let mut keyed: Vec<(String, Vec<OperationIr>)> = groups.into_iter().collect();
    keyed.sort_by(|a, b| a.0.to_title_case().cmp(&b.0.to_title_case()));

    let mut used_slugs: Vec<String> = Vec::new();
    keyed
        .into_iter()
        .map(|(key, operations)| {
            let title = key.to_title_case();
            let slug = unique_slug(&key, &mut used_slugs);
            let file_path = format!("skills/{slug}.md");
            let closed = schema_closure(&operations, &ir.schemas);
            let schemas: IndexMap<String, Value> = closed
                .into_iter()
                .filter_map(|name| ir.schemas.get(&name).map(|v| (name.clone(), v.clone())))
                .collect();
            Segment {
                key,
                title,
                slug,
                file_path,
                operations,
                schemas,
            }
        })
        .collect()
}

fn group_key(op: &OperationIr) -> String {
    if let Some(tag) = op.tags.first() {
        return tag.clone();
    }
    op.path
        .split('/')
        .find(|seg| !seg.is_empty())
        .unwrap_or("default")
        .to_string()
}

/// Lowercased alphanumeric slug, `-`-joined; collisions across groups get
/// a numeric suffix.
fn unique_slug(key: &str, used: &mut Vec<String>) -> String {
    let base = slugify(key);
    let mut slug = base.clone();
    let mut counter = 2;
    while used.contains(&slug) {
        slug = format!("{base}-{counter}");
        counter += 1;
    }
    used.push(slug.clone());
    slug
}

fn slugify(key: &str) -> String {
    let mut out = String::new();
    let mut pending = false;
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending && !out.is_empty() {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            pending = false;
        } else {
            pending = true;
        }
    }
    if out.is_empty() {
        out.push_str("default");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::compile;
    use crate::parse;
    use std::collections::BTreeSet;

    fn fixture_ir() -> SpecIr {
        let desc = parse::from_yaml(
            r##"
openapi: "3.1.0"
info: { title: Transit API, version: "1.0" }
paths:
  /routes:
    get:
      operationId: list_routes
      tags: [routes]
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema:
                type: array
                items: { $ref: "#/components/schemas/RouteOut" }
  /routes/{routeId}:
    get:
      operationId: get_route
      tags: [routes]
      parameters:
        - name: routeId
          in: path
          required: true
          schema: { type: string }
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema: { $ref: "#/components/schemas/RouteOut" }
  /alerts:
    get:
      operationId: list_alerts
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema: { $ref: "#/components/schemas/AlertOut" }
components:
  schemas:
    RouteOut:
      type: object
      properties:
        stops:
          type: array
          items: { $ref: "#/components/schemas/StopOut" }
    StopOut:
      type: object
      properties:
        name: { type: string }
    AlertOut:
      type: object
      properties:
        severity: { type: string }
"##,
        )
        .unwrap();
        compile(&desc).unwrap()
    }

    #[test]
    fn test_grouping_by_tag_and_path() {
        let ir = fixture_ir();
        let segments = segment_spec(&ir);
        let titles: Vec<&str> = segments.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Alerts", "Routes"]);

        let routes = &segments[1];
        assert_eq!(routes.operations.len(), 2);
        assert_eq!(routes.slug, "routes");
        assert_eq!(routes.file_path, "skills/routes.md");
    }

    #[test]
    fn test_segments_partition_operations() {
        let ir = fixture_ir();
        let segments = segment_spec(&ir);

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for segment in &segments {
            for op in &segment.operations {
                assert!(seen.insert(&op.id), "operation {} in two segments", op.id);
            }
        }
        let all: BTreeSet<&str> = ir.operations.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(seen, all);
    }

    #[test]
    fn test_segment_schemas_are_closed() {
        let ir = fixture_ir();
        let segments = segment_spec(&ir);

        let routes = segments.iter().find(|s| s.key == "routes").unwrap();
        let names: Vec<&String> = routes.schemas.keys().collect();
        assert_eq!(names, vec!["RouteOut", "StopOut"]);

        let alerts = segments.iter().find(|s| s.key == "alerts").unwrap();
        let names: Vec<&String> = alerts.schemas.keys().collect();
        assert_eq!(names, vec!["AlertOut"]);
    }

    #[test]
    fn test_slug_collision_gets_suffix() {
        let mut used = Vec::new();
        assert_eq!(unique_slug("User Ops", &mut used), "user-ops");
        assert_eq!(unique_slug("user-ops", &mut used), "user-ops-2");
        assert_eq!(unique_slug("user.ops", &mut used), "user-ops-3");
    }

    #[test]
    fn test_sub_ir_carries_parent_metadata() {
        let ir = fixture_ir();
        let segments = segment_spec(&ir);
        let sub = segments[1].to_spec_ir(&ir);
        assert_eq!(sub.title, "Transit API — Routes");
        assert_eq!(sub.version, ir.version);
        assert_eq!(sub.operations.len(), 2);
    }
}

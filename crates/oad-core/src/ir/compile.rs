use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::CompileError;
use crate::parse::media::{MediaType, RequestBody, Response};
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::Parameter;
use crate::parse::security::{OAuthFlow, OAuthFlows, SecurityScheme};
use crate::parse::spec::ApiDescription;

use super::summary::{render_value, summarize_schema};
use super::types::{
    ApiKeyLocation, FlowKind, HttpMethod, OperationAuthIr, OperationIr, ParameterIr,
    RequestBodyIr, ResponseIr, SecurityFlowIr, SecurityRequirementSetIr, SecuritySchemeIr, SpecIr,
};

/// Compile a normalized description into the IR. All-or-nothing: any
/// structural error aborts before an IR exists.
pub fn compile(desc: &ApiDescription) -> Result<SpecIr, CompileError> {
    let title = desc.info.title.trim();
    if title.is_empty() {
        return Err(CompileError::MissingTitle);
    }
    let version = desc.info.version.trim();
    if version.is_empty() {
        return Err(CompileError::MissingVersion);
    }

    let mut operations = Vec::new();
    for (path, item) in &desc.paths {
        collect_operations(desc, path, item, &mut operations)?;
    }
    if operations.is_empty() {
        return Err(CompileError::NoOperations);
    }

    let mut seen = HashSet::new();
    for op in &operations {
        if !seen.insert(op.id.clone()) {
            return Err(CompileError::DuplicateOperationId(op.id.clone()));
        }
    }

    operations.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.method.rank().cmp(&b.method.rank()))
    });

    let schemas = sorted_by_name(&desc.components.schemas, Clone::clone);
    let security_schemes = sorted_by_name(&desc.components.security_schemes, build_security_scheme);

    log::debug!(
        "compiled {} operations, {} schemas, {} security schemes",
        operations.len(),
        schemas.len(),
        security_schemes.len()
    );

    Ok(SpecIr {
        title: title.to_string(),
        version: version.to_string(),
        servers: desc.servers.iter().map(|s| s.url.clone()).collect(),
        security_schemes,
        operations,
        schemas,
    })
}

fn sorted_by_name<T, U>(map: &IndexMap<String, T>, build: impl Fn(&T) -> U) -> IndexMap<String, U> {
    let mut names: Vec<&String> = map.keys().collect();
    names.sort();
    names
        .into_iter()
        .filter_map(|n| map.get(n).map(|v| (n.clone(), build(v))))
        .collect()
}

fn collect_operations(
    desc: &ApiDescription,
    path: &str,
    item: &PathItem,
    out: &mut Vec<OperationIr>,
) -> Result<(), CompileError> {
    let path_params: Vec<ParameterIr> = item.parameters.iter().map(build_parameter).collect();

    macro_rules! add_op {
        ($method:expr, $op:expr) => {
            if let Some(ref op) = $op {
                out.push(build_operation(desc, $method, path, op, &path_params)?);
            }
        };
    }

    add_op!(HttpMethod::Get, item.get);
    add_op!(HttpMethod::Post, item.post);
    add_op!(HttpMethod::Put, item.put);
    add_op!(HttpMethod::Patch, item.patch);
    add_op!(HttpMethod::Delete, item.delete);
    add_op!(HttpMethod::Head, item.head);
    add_op!(HttpMethod::Options, item.options);
    add_op!(HttpMethod::Trace, item.trace);

    Ok(())
}

fn build_operation(
    desc: &ApiDescription,
    method: HttpMethod,
    path: &str,
    op: &Operation,
    path_params: &[ParameterIr],
) -> Result<OperationIr, CompileError> {
    let id = op
        .operation_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| derived_id(method, path));

    let parameters = merge_parameters(path_params, &op.parameters);
    let request_body = op.request_body.as_ref().and_then(build_request_body);
    let responses = op
        .responses
        .iter()
        .map(|(status, r)| build_response(status, r))
        .collect();
    let auth = resolve_auth(desc, &id, op)?;

    Ok(OperationIr {
        id,
        method,
        path: path.to_string(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        tags: op.tags.clone(),
        parameters,
        request_body,
        responses,
        auth,
    })
}

/// Deterministic fallback identifier: lower-cased method and path, with
/// non-alphanumeric runs collapsed to underscores. `GET /` → `get_root`.
fn derived_id(method: HttpMethod, path: &str) -> String {
    let mut slug = String::new();
    let mut pending = false;
    for ch in path.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending && !slug.is_empty() {
                slug.push('_');
            }
            slug.push(ch.to_ascii_lowercase());
            pending = false;
        } else {
            pending = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("root");
    }
    format!("{}_{}", method.as_str().to_lowercase(), slug)
}

/// Path-level parameters first, then operation-level ones; an
/// operation-level parameter replaces a path-level one with the same
/// (location, name) key in place.
fn merge_parameters(path_params: &[ParameterIr], op_params: &[Parameter]) -> Vec<ParameterIr> {
    let mut merged = path_params.to_vec();
    for param in op_params {
        let candidate = build_parameter(param);
        match merged
            .iter_mut()
            .find(|p| p.location == candidate.location && p.name == candidate.name)
        {
            Some(slot) => *slot = candidate,
            None => merged.push(candidate),
        }
    }
    merged
}

fn build_parameter(param: &Parameter) -> ParameterIr {
    let schema = param
        .schema
        .as_ref()
        .map(summarize_schema)
        .unwrap_or_else(|| "any".to_string());
    let default = param
        .schema
        .as_ref()
        .and_then(|s| s.get("default"))
        .map(render_value);
    let enum_values = param
        .schema
        .as_ref()
        .and_then(|s| s.get("enum"))
        .and_then(Value::as_array)
        .map(|values| values.iter().map(render_value).collect())
        .unwrap_or_default();

    ParameterIr {
        name: param.name.clone(),
        location: param.location,
        required: param.required,
        schema,
        description: param.description.clone(),
        default,
        enum_values,
    }
}

/// Pick the JSON media type when present, else the first media type with a
/// declared schema, else the first declared media type.
fn select_media<'a>(content: &'a IndexMap<String, MediaType>) -> Option<&'a MediaType> {
    content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(key, _)| key.ends_with("+json"))
                .map(|(_, media)| media)
        })
        .or_else(|| content.values().find(|media| media.schema.is_some()))
        .or_else(|| content.values().next())
}

fn build_request_body(body: &RequestBody) -> Option<RequestBodyIr> {
    let media = select_media(&body.content)?;
    let schema = media
        .schema
        .as_ref()
        .map(summarize_schema)
        .unwrap_or_else(|| "any".to_string());

    Some(RequestBodyIr {
        required: body.required,
        schema,
        content_types: body.content.keys().cloned().collect(),
        description: body.description.clone(),
    })
}

fn build_response(status: &str, response: &Response) -> ResponseIr {
    let schema = select_media(&response.content)
        .and_then(|media| media.schema.as_ref())
        .map(summarize_schema);

    ResponseIr {
        status: status.to_string(),
        description: response.description.clone(),
        schema,
        content_types: response.content.keys().cloned().collect(),
    }
}

/// Resolve the applicable security requirement list for one operation.
///
/// A declared list overrides the document default; no applicable list at
/// all (or a declared empty list, the usual auth-off override) compiles to
/// no requirement. An empty alternative inside the list marks auth as
/// optional; the remaining alternatives become sorted, de-duplicated
/// requirement sets.
fn resolve_auth(
    desc: &ApiDescription,
    operation_id: &str,
    op: &Operation,
) -> Result<Option<OperationAuthIr>, CompileError> {
    let (list, inherited) = match &op.security {
        Some(list) => (list, false),
        None => match &desc.security {
            Some(list) => (list, true),
            None => return Ok(None),
        },
    };
    if list.is_empty() {
        return Ok(None);
    }

    let mut optional = false;
    let mut requirements: Vec<SecurityRequirementSetIr> = Vec::new();

    for alternative in list {
        if alternative.is_empty() {
            optional = true;
            continue;
        }

        let mut schemes: Vec<(String, Vec<String>)> = alternative
            .iter()
            .map(|(name, scopes)| {
                let mut scopes = scopes.clone();
                scopes.sort();
                (name.clone(), scopes)
            })
            .collect();
        schemes.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, _) in &schemes {
            if !desc.components.security_schemes.contains_key(name) {
                return Err(CompileError::UnknownSecurityScheme {
                    operation: operation_id.to_string(),
                    scheme: name.clone(),
                });
            }
        }

        let set = SecurityRequirementSetIr { schemes };
        if !requirements.contains(&set) {
            requirements.push(set);
        }
    }

    Ok(Some(OperationAuthIr {
        inherited,
        optional,
        requirements,
    }))
}

fn build_security_scheme(raw: &SecurityScheme) -> SecuritySchemeIr {
    match raw.scheme_type.as_str() {
        "apiKey" => SecuritySchemeIr::ApiKey {
            location: match raw.location.as_deref() {
                Some("query") => ApiKeyLocation::Query,
                Some("cookie") => ApiKeyLocation::Cookie,
                _ => ApiKeyLocation::Header,
            },
            name: raw.name.clone().unwrap_or_default(),
        },
        "http" => SecuritySchemeIr::Http {
            scheme: raw.scheme.clone().unwrap_or_default(),
            bearer_format: raw.bearer_format.clone(),
        },
        "oauth2" => SecuritySchemeIr::OAuth2 {
            flows: build_flows(raw.flows.as_ref()),
        },
        "openIdConnect" => SecuritySchemeIr::OpenIdConnect {
            url: raw.open_id_connect_url.clone(),
        },
        "mutualTLS" => SecuritySchemeIr::MutualTls,
        _ => SecuritySchemeIr::Unknown,
    }
}

fn build_flows(flows: Option<&OAuthFlows>) -> Vec<SecurityFlowIr> {
    let Some(flows) = flows else {
        return Vec::new();
    };

    let mut out = Vec::new();
    if let Some(flow) = &flows.authorization_code {
        out.push(build_flow(FlowKind::AuthorizationCode, flow));
    }
    if let Some(flow) = &flows.implicit {
        out.push(build_flow(FlowKind::Implicit, flow));
    }
    if let Some(flow) = &flows.password {
        out.push(build_flow(FlowKind::Password, flow));
    }
    if let Some(flow) = &flows.client_credentials {
        out.push(build_flow(FlowKind::ClientCredentials, flow));
    }
    out
}

fn build_flow(kind: FlowKind, flow: &OAuthFlow) -> SecurityFlowIr {
    let mut scopes: Vec<String> = flow.scopes.keys().cloned().collect();
    scopes.sort();
    SecurityFlowIr {
        kind,
        authorization_url: flow.authorization_url.clone(),
        token_url: flow.token_url.clone(),
        scopes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn compile_yaml(input: &str) -> SpecIr {
        let desc = parse::from_yaml(input).unwrap();
        compile(&desc).unwrap()
    }

    const MINIMAL: &str = r#"
openapi: "3.1.0"
info:
  title: Transit API
  version: "1.0"
paths:
  /routes:
    get:
      operationId: list_routes
      responses:
        "200":
          description: OK
"#;

    #[test]
    fn test_minimal_compiles() {
        let ir = compile_yaml(MINIMAL);
        assert_eq!(ir.title, "Transit API");
        assert_eq!(ir.operations.len(), 1);
        assert_eq!(ir.operations[0].id, "list_routes");
        assert!(ir.operations[0].auth.is_none());
    }

    #[test]
    fn test_derived_id() {
        assert_eq!(derived_id(HttpMethod::Get, "/"), "get_root");
        assert_eq!(derived_id(HttpMethod::Get, ""), "get_root");
        assert_eq!(
            derived_id(HttpMethod::Post, "/routes/{routeId}/stops"),
            "post_routes_routeid_stops"
        );
        assert_eq!(derived_id(HttpMethod::Delete, "/v1/items/"), "delete_v1_items");
    }

    #[test]
    fn test_blank_operation_id_falls_back() {
        let ir = compile_yaml(
            r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths:
  /things:
    get:
      operationId: "   "
      responses: {}
"#,
        );
        assert_eq!(ir.operations[0].id, "get_things");
    }

    #[test]
    fn test_parameter_merge_precedence() {
        let ir = compile_yaml(
            r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths:
  /routes:
    parameters:
      - name: limit
        in: query
        required: false
        schema: { type: integer }
      - name: city
        in: query
        schema: { type: string }
    get:
      operationId: list_routes
      parameters:
        - name: limit
          in: query
          required: true
          schema: { type: integer }
      responses: {}
"#,
        );
        let params = &ir.operations[0].parameters;
        assert_eq!(params.len(), 2);
        // Operation-level wins, in the path-level slot.
        assert_eq!(params[0].name, "limit");
        assert!(params[0].required);
        assert_eq!(params[1].name, "city");
    }

    #[test]
    fn test_operation_ordering_is_deterministic() {
        let ir = compile_yaml(
            r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths:
  /b:
    post:
      responses: {}
    get:
      responses: {}
  /a:
    get:
      responses: {}
"#,
        );
        let ids: Vec<&str> = ir.operations.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["get_a", "get_b", "post_b"]);
    }

    #[test]
    fn test_duplicate_operation_id_rejected() {
        let desc = parse::from_yaml(
            r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths:
  /a:
    get:
      operationId: dup
      responses: {}
  /b:
    get:
      operationId: dup
      responses: {}
"#,
        )
        .unwrap();
        let err = compile(&desc).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateOperationId(ref id) if id == "dup"));
        assert_eq!(err.code(), "SPEC_DUPLICATE_OPERATION_ID");
    }

    #[test]
    fn test_no_operations_rejected() {
        let desc = parse::from_yaml(
            r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths: {}
"#,
        )
        .unwrap();
        assert!(matches!(compile(&desc).unwrap_err(), CompileError::NoOperations));
    }

    #[test]
    fn test_request_body_prefers_json() {
        let ir = compile_yaml(
            r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths:
  /upload:
    post:
      operationId: upload
      requestBody:
        required: true
        content:
          application/octet-stream:
            schema: { type: string }
          application/json:
            schema: { type: object, properties: { name: { type: string } } }
      responses: {}
"#,
        );
        let body = ir.operations[0].request_body.as_ref().unwrap();
        assert_eq!(body.schema, "object(1 properties)");
        assert_eq!(
            body.content_types,
            vec!["application/octet-stream", "application/json"]
        );
        assert!(body.required);
    }

    const SECURED: &str = r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
security:
  - BearerAuth: []
paths:
  /public:
    get:
      operationId: public_op
      security: []
      responses: {}
  /inherited:
    get:
      operationId: inherited_op
      responses: {}
  /declared:
    get:
      operationId: declared_op
      security:
        - ApiKeyAuth: []
        - {}
        - ApiKeyAuth: []
      responses: {}
  /scoped:
    get:
      operationId: scoped_op
      security:
        - OAuth: [write, read]
          BearerAuth: []
      responses: {}
components:
  securitySchemes:
    BearerAuth:
      type: http
      scheme: bearer
    ApiKeyAuth:
      type: apiKey
      in: header
      name: x-api-key
    OAuth:
      type: oauth2
      flows:
        password:
          tokenUrl: /oauth/token
          scopes:
            read: Read access
            write: Write access
"#;

    #[test]
    fn test_auth_three_way_distinction() {
        let ir = compile_yaml(SECURED);
        let by_id = |id: &str| ir.operations.iter().find(|o| o.id == id).unwrap();

        // security: [] disables auth, no requirement at all
        assert!(by_id("public_op").auth.is_none());

        // inherits the document default
        let inherited = by_id("inherited_op").auth.as_ref().unwrap();
        assert!(inherited.inherited);
        assert!(!inherited.optional);
        assert_eq!(inherited.scheme_names(), vec!["BearerAuth"]);

        // declared locally, with an empty alternative and a duplicate set
        let declared = by_id("declared_op").auth.as_ref().unwrap();
        assert!(!declared.inherited);
        assert!(declared.optional);
        assert_eq!(declared.requirements.len(), 1);
    }

    #[test]
    fn test_requirement_set_sorted() {
        let ir = compile_yaml(SECURED);
        let scoped = ir
            .operations
            .iter()
            .find(|o| o.id == "scoped_op")
            .and_then(|o| o.auth.as_ref())
            .unwrap();
        let set = &scoped.requirements[0];
        assert_eq!(set.schemes[0].0, "BearerAuth");
        assert_eq!(set.schemes[1].0, "OAuth");
        assert_eq!(set.schemes[1].1, vec!["read", "write"]);
    }

    #[test]
    fn test_unknown_security_scheme_rejected() {
        let desc = parse::from_yaml(
            r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths:
  /a:
    get:
      operationId: a
      security:
        - Ghost: []
      responses: {}
"#,
        )
        .unwrap();
        let err = compile(&desc).unwrap_err();
        assert_eq!(err.code(), "SPEC_UNKNOWN_SECURITY_SCHEME");
    }

    #[test]
    fn test_security_schemes_are_tagged() {
        let ir = compile_yaml(SECURED);
        assert_eq!(ir.security_schemes["ApiKeyAuth"].kind(), "api-key");
        assert_eq!(ir.security_schemes["BearerAuth"].kind(), "http");
        match &ir.security_schemes["OAuth"] {
            SecuritySchemeIr::OAuth2 { flows } => {
                assert_eq!(flows.len(), 1);
                assert_eq!(flows[0].kind, FlowKind::Password);
                assert_eq!(flows[0].scopes, vec!["read", "write"]);
            }
            other => panic!("expected oauth2, got {other:?}"),
        }
    }

    #[test]
    fn test_schemas_sorted_by_name() {
        let ir = compile_yaml(
            r#"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths:
  /a:
    get:
      operationId: a
      responses: {}
components:
  schemas:
    Zebra: { type: string }
    Alpha: { type: integer }
"#,
        );
        let names: Vec<&String> = ir.schemas.keys().collect();
        assert_eq!(names, vec!["Alpha", "Zebra"]);
    }
}

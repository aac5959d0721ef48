//! Immutable endpoint metadata.
//!
//! # Design
//! An `EndpointDescriptor` is pure data: verb, parsed path template, ordered
//! parameter declarations, static headers, and the body/response encodings.
//! Descriptors are built once through [`DescriptorBuilder::build`], which is
//! the only place a template and its declared path parameters are checked
//! against each other. A mismatch is a programmer error and surfaces as
//! [`ApiError::Configuration`] when the catalogue loads, never mid-request.
//! After construction a descriptor is only read, so one instance is shared
//! by every concurrent call to the endpoint.

use std::collections::HashSet;

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::wire::WireEnum;

/// Declared encoding of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Decimal integer.
    Int,
    /// String, escaped as needed by its position.
    Str,
    /// Literal `true` / `false`.
    Bool,
    /// One of a fixed set of wire names.
    Enum {
        type_name: &'static str,
        wire_names: &'static [&'static str],
    },
}

impl ValueKind {
    pub fn enumeration<E: WireEnum>() -> Self {
        ValueKind::Enum {
            type_name: E::TYPE_NAME,
            wire_names: E::WIRE_NAMES,
        }
    }
}

/// Declaration of one path or query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub required: bool,
    /// A repeated parameter binds to an ordered list and emits one pair per
    /// element. Only query parameters can be repeated.
    pub repeated: bool,
}

/// How the request body is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyKind {
    None,
    Json,
    Form { fields: Vec<&'static str> },
    Multipart { parts: Vec<&'static str> },
}

/// How a successful response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Body is discarded.
    None,
    /// A JSON number, string or boolean.
    JsonScalar,
    JsonObject,
    JsonList,
    /// Body returned verbatim as text.
    RawString,
}

/// One piece of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Immutable description of one endpoint.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    name: &'static str,
    method: HttpMethod,
    template: &'static str,
    segments: Vec<Segment>,
    fixed_query: Vec<(String, String)>,
    path_params: Vec<ParamSpec>,
    query_params: Vec<ParamSpec>,
    headers: Vec<(&'static str, &'static str)>,
    body: BodyKind,
    response: ResponseKind,
    full_response: bool,
}

impl EndpointDescriptor {
    pub fn builder(
        name: &'static str,
        method: HttpMethod,
        template: &'static str,
    ) -> DescriptorBuilder {
        DescriptorBuilder {
            name,
            method,
            template,
            path_params: Vec::new(),
            query_params: Vec::new(),
            headers: Vec::new(),
            body: BodyKind::None,
            response: ResponseKind::None,
            full_response: false,
        }
    }

    pub fn get(name: &'static str, template: &'static str) -> DescriptorBuilder {
        Self::builder(name, HttpMethod::Get, template)
    }

    pub fn post(name: &'static str, template: &'static str) -> DescriptorBuilder {
        Self::builder(name, HttpMethod::Post, template)
    }

    pub fn put(name: &'static str, template: &'static str) -> DescriptorBuilder {
        Self::builder(name, HttpMethod::Put, template)
    }

    pub fn delete(name: &'static str, template: &'static str) -> DescriptorBuilder {
        Self::builder(name, HttpMethod::Delete, template)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn template(&self) -> &'static str {
        self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Query pairs written into the template itself, emitted before any
    /// bound query parameter.
    pub fn fixed_query(&self) -> &[(String, String)] {
        &self.fixed_query
    }

    pub fn path_params(&self) -> &[ParamSpec] {
        &self.path_params
    }

    pub fn query_params(&self) -> &[ParamSpec] {
        &self.query_params
    }

    pub fn headers(&self) -> &[(&'static str, &'static str)] {
        &self.headers
    }

    pub fn body(&self) -> &BodyKind {
        &self.body
    }

    pub fn response(&self) -> ResponseKind {
        self.response
    }

    /// Whether callers receive status and headers alongside the value.
    pub fn full_response(&self) -> bool {
        self.full_response
    }

    pub fn path_param(&self, name: &str) -> Option<&ParamSpec> {
        self.path_params.iter().find(|p| p.name == name)
    }

    pub fn query_param(&self, name: &str) -> Option<&ParamSpec> {
        self.query_params.iter().find(|p| p.name == name)
    }
}

/// Accumulates a descriptor's declarations; validated by [`Self::build`].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: &'static str,
    method: HttpMethod,
    template: &'static str,
    path_params: Vec<ParamSpec>,
    query_params: Vec<ParamSpec>,
    headers: Vec<(&'static str, &'static str)>,
    body: BodyKind,
    response: ResponseKind,
    full_response: bool,
}

impl DescriptorBuilder {
    pub fn path(mut self, name: &'static str, kind: ValueKind) -> Self {
        self.path_params.push(ParamSpec {
            name,
            kind,
            required: true,
            repeated: false,
        });
        self
    }

    pub fn query(mut self, name: &'static str, kind: ValueKind) -> Self {
        self.query_params.push(ParamSpec {
            name,
            kind,
            required: true,
            repeated: false,
        });
        self
    }

    pub fn optional_query(mut self, name: &'static str, kind: ValueKind) -> Self {
        self.query_params.push(ParamSpec {
            name,
            kind,
            required: false,
            repeated: false,
        });
        self
    }

    pub fn repeated_query(mut self, name: &'static str, kind: ValueKind) -> Self {
        self.query_params.push(ParamSpec {
            name,
            kind,
            required: false,
            repeated: true,
        });
        self
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn accept_json(self) -> Self {
        self.header("Accept", "application/json")
    }

    pub fn json_content_type(self) -> Self {
        self.header("Content-Type", "application/json")
    }

    pub fn json_body(mut self) -> Self {
        self.body = BodyKind::Json;
        self
    }

    pub fn form_body(mut self, fields: &[&'static str]) -> Self {
        self.body = BodyKind::Form {
            fields: fields.to_vec(),
        };
        self
    }

    pub fn multipart_body(mut self, parts: &[&'static str]) -> Self {
        self.body = BodyKind::Multipart {
            parts: parts.to_vec(),
        };
        self
    }

    pub fn returns(mut self, response: ResponseKind) -> Self {
        self.response = response;
        self
    }

    pub fn full_response(mut self) -> Self {
        self.full_response = true;
        self
    }

    /// Validate the declarations and freeze them into a descriptor.
    pub fn build(self) -> Result<EndpointDescriptor, ApiError> {
        let name = self.name;
        let fail = |message: String| ApiError::configuration(name, message);

        if self.template.starts_with('/') {
            return Err(fail("path template must be relative to the base URL".to_string()));
        }
        let (path, query) = match self.template.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (self.template, None),
        };

        let segments = parse_segments(path).map_err(fail)?;
        let fixed_query = match query {
            Some(query) => parse_fixed_query(query).map_err(fail)?,
            None => Vec::new(),
        };

        let mut placeholders = HashSet::new();
        for segment in &segments {
            if let Segment::Param(param) = segment {
                if !placeholders.insert(param.as_str()) {
                    return Err(fail(format!("placeholder '{{{param}}}' appears more than once")));
                }
            }
        }
        let mut declared = HashSet::new();
        for spec in &self.path_params {
            if !declared.insert(spec.name) {
                return Err(fail(format!("path parameter '{}' declared twice", spec.name)));
            }
            if spec.kind == ValueKind::Bool {
                return Err(fail(format!("path parameter '{}' cannot be boolean", spec.name)));
            }
            if !placeholders.contains(spec.name) {
                return Err(fail(format!(
                    "path parameter '{}' has no placeholder in '{}'",
                    spec.name, self.template
                )));
            }
        }
        if let Some(orphan) = placeholders.iter().find(|p| !declared.contains(*p)) {
            return Err(fail(format!("placeholder '{{{orphan}}}' has no declared path parameter")));
        }

        let mut query_names: HashSet<&str> = fixed_query.iter().map(|(k, _)| k.as_str()).collect();
        for spec in &self.query_params {
            if !query_names.insert(spec.name) {
                return Err(fail(format!("query parameter '{}' declared twice", spec.name)));
            }
        }

        match &self.body {
            BodyKind::Form { fields } if fields.is_empty() => {
                return Err(fail("form body declares no fields".to_string()));
            }
            BodyKind::Multipart { parts } if parts.is_empty() => {
                return Err(fail("multipart body declares no parts".to_string()));
            }
            BodyKind::None => {}
            _ if self.method == HttpMethod::Get => {
                return Err(fail("GET endpoints cannot carry a body".to_string()));
            }
            _ => {}
        }

        Ok(EndpointDescriptor {
            name,
            method: self.method,
            template: self.template,
            segments,
            fixed_query,
            path_params: self.path_params,
            query_params: self.query_params,
            headers: self.headers,
            body: self.body,
            response: self.response,
            full_response: self.full_response,
        })
    }
}

fn parse_segments(path: &str) -> Result<Vec<Segment>, String> {
    path.split('/')
        .map(|raw| {
            if let Some(inner) = raw.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| format!("unterminated placeholder in segment '{raw}'"))?;
                if name.is_empty() || name.contains(['{', '}']) {
                    return Err(format!("malformed placeholder '{raw}'"));
                }
                Ok(Segment::Param(name.to_string()))
            } else if raw.contains(['{', '}']) {
                Err(format!("placeholder must span a whole segment: '{raw}'"))
            } else {
                Ok(Segment::Literal(raw.to_string()))
            }
        })
        .collect()
}

fn parse_fixed_query(query: &str) -> Result<Vec<(String, String)>, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            if pair.contains(['{', '}']) {
                return Err(format!("placeholders are not allowed in the query: '{pair}'"));
            }
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((k.to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ClubMemberStatus;

    fn config_message(result: Result<EndpointDescriptor, ApiError>) -> String {
        match result {
            Err(ApiError::Configuration { message, .. }) => message,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn parses_template_segments() {
        let template = "profiles/{profileId}/activities/{activityId}";
        let d = EndpointDescriptor::get("get_activity", template)
            .path("profileId", ValueKind::Int)
            .path("activityId", ValueKind::Int)
            .build()
            .unwrap();
        assert_eq!(
            d.segments(),
            &[
                Segment::Literal("profiles".to_string()),
                Segment::Param("profileId".to_string()),
                Segment::Literal("activities".to_string()),
                Segment::Param("activityId".to_string()),
            ]
        );
        assert!(d.fixed_query().is_empty());
    }

    #[test]
    fn keeps_trailing_slash_and_fixed_query() {
        let d = EndpointDescriptor::get("feed", "activity-feed/feed/").build().unwrap();
        assert_eq!(d.segments().last(), Some(&Segment::Literal(String::new())));

        let template = "events-core/events/template/categories?affiliation=clubs";
        let d = EndpointDescriptor::get("templates", template)
            .optional_query("sport", ValueKind::Str)
            .build()
            .unwrap();
        assert_eq!(d.fixed_query(), &[("affiliation".to_string(), "clubs".to_string())]);
    }

    #[test]
    fn orphan_placeholder_is_rejected() {
        let msg = config_message(EndpointDescriptor::get("x", "events/{id}").build());
        assert!(msg.contains("{id}"), "{msg}");
    }

    #[test]
    fn undeclared_placeholder_for_param_is_rejected() {
        let msg = config_message(
            EndpointDescriptor::get("x", "events/{id}")
                .path("id", ValueKind::Int)
                .path("eventId", ValueKind::Int)
                .build(),
        );
        assert!(msg.contains("eventId"), "{msg}");
    }

    #[test]
    fn duplicate_placeholder_is_rejected() {
        let msg = config_message(
            EndpointDescriptor::get("x", "a/{id}/b/{id}")
                .path("id", ValueKind::Int)
                .build(),
        );
        assert!(msg.contains("more than once"), "{msg}");
    }

    #[test]
    fn malformed_templates_are_rejected() {
        config_message(EndpointDescriptor::get("x", "/leading").build());
        config_message(EndpointDescriptor::get("x", "a/{id").path("id", ValueKind::Int).build());
        config_message(
            EndpointDescriptor::get("x", "a/pre{id}")
                .path("id", ValueKind::Int)
                .build(),
        );
        config_message(EndpointDescriptor::get("x", "a/{}").build());
    }

    #[test]
    fn duplicate_query_is_rejected() {
        config_message(
            EndpointDescriptor::get("x", "clubs")
                .query("start", ValueKind::Int)
                .query("start", ValueKind::Int)
                .build(),
        );
        config_message(
            EndpointDescriptor::get("x", "clubs?start=0")
                .query("start", ValueKind::Int)
                .build(),
        );
    }

    #[test]
    fn body_declarations_are_checked() {
        config_message(EndpointDescriptor::get("x", "a").json_body().build());
        config_message(EndpointDescriptor::post("x", "a").form_body(&[]).build());
        config_message(EndpointDescriptor::post("x", "a").multipart_body(&[]).build());
    }

    #[test]
    fn repeated_query_is_optional() {
        let d = EndpointDescriptor::get("roster", "clubs/club/{id}/roster")
            .path("id", ValueKind::Str)
            .repeated_query("status", ValueKind::enumeration::<ClubMemberStatus>())
            .build()
            .unwrap();
        let status = d.query_param("status").unwrap();
        assert!(status.repeated);
        assert!(!status.required);
        assert_eq!(
            status.kind,
            ValueKind::Enum {
                type_name: "ClubMemberStatus",
                wire_names: &["MEMBER", "INVITED", "REQUESTED", "BANNED", "REJECTED", "LEFT"],
            }
        );
    }
}

//! Request body encoding and response body decoding.
//!
//! # Design
//! A request body is an explicit tagged union resolved at the call site,
//! never an untyped value. Which variant is acceptable is fixed by the
//! endpoint's [`BodyKind`], and so is the `Content-Type` that goes with it.
//!
//! Response decoding mirrors this through [`ResponseKind`]. A body that does
//! not have the declared shape (including an empty body where one was
//! expected) is a [`ApiError::Decoding`]; nothing is coerced to a default.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;
use uuid::Uuid;

use crate::descriptor::{BodyKind, EndpointDescriptor, ResponseKind};
use crate::error::ApiError;

pub const JSON: &str = "application/json";
pub const FORM: &str = "application/x-www-form-urlencoded";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A request body supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Already-serialized JSON, sent unchanged after a well-formedness check.
    Bytes(Vec<u8>),
    Form(Vec<(String, String)>),
    Multipart(Vec<Part>),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(RequestBody::Json)
    }

    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Form(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Part {
    /// A binary part, e.g. an uploaded image.
    pub fn bytes(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: content_type.into(),
            data,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Encoded body plus the content type it must be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub(crate) fn encode_body(
    descriptor: &EndpointDescriptor,
    body: Option<&RequestBody>,
) -> Result<Option<EncodedBody>, ApiError> {
    let endpoint = descriptor.name();
    match (descriptor.body(), body) {
        (BodyKind::None, None) => Ok(None),
        (BodyKind::None, Some(_)) => {
            Err(ApiError::encoding(endpoint, "endpoint does not accept a body"))
        }
        (_, None) => Err(ApiError::encoding(endpoint, "missing request body")),
        (BodyKind::Json, Some(RequestBody::Json(value))) => {
            let bytes =
                serde_json::to_vec(value).map_err(|e| ApiError::encoding(endpoint, e.to_string()))?;
            Ok(Some(EncodedBody {
                content_type: JSON.to_string(),
                bytes,
            }))
        }
        (BodyKind::Json, Some(RequestBody::Bytes(bytes))) => {
            serde_json::from_slice::<serde::de::IgnoredAny>(bytes)
                .map_err(|e| ApiError::encoding(endpoint, format!("body is not valid JSON: {e}")))?;
            Ok(Some(EncodedBody {
                content_type: JSON.to_string(),
                bytes: bytes.clone(),
            }))
        }
        (BodyKind::Form { fields }, Some(RequestBody::Form(bound))) => {
            encode_form(endpoint, fields, bound).map(Some)
        }
        (BodyKind::Multipart { parts }, Some(RequestBody::Multipart(bound))) => {
            encode_multipart(endpoint, parts, bound).map(Some)
        }
        (kind, Some(_)) => Err(ApiError::encoding(
            endpoint,
            format!("body variant does not match declared {kind:?} body"),
        )),
    }
}

fn encode_form(
    endpoint: &str,
    declared: &[&'static str],
    bound: &[(String, String)],
) -> Result<EncodedBody, ApiError> {
    if let Some((unknown, _)) = bound.iter().find(|(k, _)| !declared.iter().any(|d| d == k)) {
        return Err(ApiError::encoding(endpoint, format!("undeclared form field '{unknown}'")));
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for field in declared {
        let value = bound
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v)
            .ok_or_else(|| ApiError::encoding(endpoint, format!("missing form field '{field}'")))?;
        serializer.append_pair(field, value);
    }
    Ok(EncodedBody {
        content_type: FORM.to_string(),
        bytes: serializer.finish().into_bytes(),
    })
}

fn encode_multipart(
    endpoint: &str,
    declared: &[&'static str],
    parts: &[Part],
) -> Result<EncodedBody, ApiError> {
    if let Some(part) = parts.iter().find(|p| !declared.iter().any(|d| *d == p.name)) {
        return Err(ApiError::encoding(
            endpoint,
            format!("undeclared multipart part '{}'", part.name),
        ));
    }
    if let Some(missing) = declared.iter().find(|d| !parts.iter().any(|p| p.name == **d)) {
        return Err(ApiError::encoding(endpoint, format!("missing multipart part '{missing}'")));
    }
    let boundary = pick_boundary(parts);
    Ok(EncodedBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        bytes: frame_multipart(&boundary, parts),
    })
}

/// Random boundary that does not occur in any part's content.
fn pick_boundary(parts: &[Part]) -> String {
    loop {
        let boundary = format!("ride-api-{}", Uuid::new_v4().simple());
        let collides = parts
            .iter()
            .any(|p| p.data.windows(boundary.len()).any(|w| w == boundary.as_bytes()));
        if !collides {
            return boundary;
        }
    }
}

pub(crate) fn frame_multipart(boundary: &str, parts: &[Part]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        let disposition = match &part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape_quoted(&part.name),
                escape_quoted(filename)
            ),
            None => format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n",
                escape_quoted(&part.name)
            ),
        };
        out.extend_from_slice(disposition.as_bytes());
        out.extend_from_slice(format!("Content-Type: {}\r\n", part.content_type).as_bytes());
        out.extend_from_slice(format!("Content-Length: {}\r\n\r\n", part.data.len()).as_bytes());
        out.extend_from_slice(&part.data);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace(['\r', '\n'], " ")
}

/// A successful response body after shape checking, before typing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Decoded {
    Empty,
    Json(Value),
    Text(String),
}

impl Decoded {
    pub(crate) fn into_typed<T: DeserializeOwned>(self, endpoint: &str) -> Result<T, ApiError> {
        let value = match self {
            Decoded::Empty => Value::Null,
            Decoded::Json(value) => value,
            Decoded::Text(text) => Value::String(text),
        };
        serde_json::from_value(value).map_err(|e| ApiError::decoding(endpoint, e.to_string()))
    }
}

pub(crate) fn decode_body(
    endpoint: &str,
    kind: ResponseKind,
    body: &[u8],
) -> Result<Decoded, ApiError> {
    match kind {
        ResponseKind::None => Ok(Decoded::Empty),
        ResponseKind::RawString => {
            if body.is_empty() {
                return Err(ApiError::decoding(endpoint, "empty body where text was expected"));
            }
            String::from_utf8(body.to_vec())
                .map(Decoded::Text)
                .map_err(|e| ApiError::decoding(endpoint, e.to_string()))
        }
        ResponseKind::JsonScalar | ResponseKind::JsonObject | ResponseKind::JsonList => {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Err(ApiError::decoding(
                    endpoint,
                    format!("empty body where {kind:?} was expected"),
                ));
            }
            let value: Value = serde_json::from_slice(body)
                .map_err(|e| ApiError::decoding(endpoint, e.to_string()))?;
            let shape_ok = match kind {
                ResponseKind::JsonObject => value.is_object(),
                ResponseKind::JsonList => value.is_array(),
                _ => value.is_number() || value.is_string() || value.is_boolean(),
            };
            if !shape_ok {
                return Err(ApiError::decoding(
                    endpoint,
                    format!("expected {kind:?}, got {}", shape_name(&value)),
                ));
            }
            Ok(Decoded::Json(value))
        }
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

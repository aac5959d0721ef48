//! Parameter encoding: path substitution and query strings.
//!
//! Values are bound as [`ParamValue`]s and checked against the declared
//! [`ValueKind`] when bound. Encoding then walks the descriptor, not the
//! bound values, so output order is always declaration order and repeated
//! parameters keep the caller's element order.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::descriptor::{EndpointDescriptor, ParamSpec, Segment, ValueKind};
use crate::error::ApiError;
use crate::wire::WireEnum;

/// Everything except RFC 3986 unreserved characters is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// A call-site argument after conversion, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Enum {
        type_name: &'static str,
        wire: &'static str,
    },
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn from_enum<E: WireEnum>(value: E) -> Self {
        ParamValue::Enum {
            type_name: E::TYPE_NAME,
            wire: value.wire_name(),
        }
    }

    fn matches_scalar(&self, kind: ValueKind) -> bool {
        match (self, kind) {
            (ParamValue::Int(_), ValueKind::Int)
            | (ParamValue::Str(_), ValueKind::Str)
            | (ParamValue::Bool(_), ValueKind::Bool) => true,
            (
                ParamValue::Enum { type_name, wire },
                ValueKind::Enum {
                    type_name: declared,
                    wire_names,
                },
            ) => *type_name == declared && wire_names.contains(wire),
            _ => false,
        }
    }

    /// Unescaped string form of a scalar value.
    fn to_wire(&self) -> String {
        match self {
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Str(v) => v.clone(),
            ParamValue::Bool(v) => v.to_string(),
            ParamValue::Enum { wire, .. } => (*wire).to_string(),
            ParamValue::List(items) => {
                items.iter().map(ParamValue::to_wire).collect::<Vec<_>>().join(",")
            }
        }
    }
}

/// Conversion of a typed argument into a bindable value. `None` means the
/// argument is absent and nothing is emitted for it.
pub trait IntoParam {
    fn into_param(self) -> Option<ParamValue>;
}

impl IntoParam for ParamValue {
    fn into_param(self) -> Option<ParamValue> {
        Some(self)
    }
}

impl IntoParam for i64 {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Int(self))
    }
}

impl IntoParam for i32 {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Int(self.into()))
    }
}

impl IntoParam for u32 {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Int(self.into()))
    }
}

impl IntoParam for bool {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Bool(self))
    }
}

impl IntoParam for &str {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Str(self.to_string()))
    }
}

impl IntoParam for String {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Str(self))
    }
}

impl<T: IntoParam> IntoParam for Option<T> {
    fn into_param(self) -> Option<ParamValue> {
        self.and_then(IntoParam::into_param)
    }
}

impl<T: IntoParam> IntoParam for Vec<T> {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::List(self.into_iter().filter_map(IntoParam::into_param).collect()))
    }
}

impl<T: IntoParam + Clone> IntoParam for &[T] {
    fn into_param(self) -> Option<ParamValue> {
        self.to_vec().into_param()
    }
}

/// Check a bound value against its declaration.
pub(crate) fn check_binding(
    endpoint: &str,
    spec: &ParamSpec,
    value: &ParamValue,
) -> Result<(), ApiError> {
    let ok = match value {
        ParamValue::List(items) => {
            spec.repeated && items.iter().all(|v| v.matches_scalar(spec.kind))
        }
        scalar => !spec.repeated && scalar.matches_scalar(spec.kind),
    };
    if ok {
        Ok(())
    } else {
        Err(ApiError::encoding(
            endpoint,
            format!("value {value:?} does not match declared encoding of '{}'", spec.name),
        ))
    }
}

/// Substitute bound path values into the template.
///
/// Values are percent-escaped. Every path parameter is required.
pub(crate) fn render_path(
    descriptor: &EndpointDescriptor,
    bound: &[(&'static str, ParamValue)],
) -> Result<String, ApiError> {
    let mut parts = Vec::with_capacity(descriptor.segments().len());
    for segment in descriptor.segments() {
        match segment {
            Segment::Literal(literal) => parts.push(literal.clone()),
            Segment::Param(name) => match lookup(bound, name) {
                Some(value) => parts.push(encode_path_value(descriptor.name(), name, value)?),
                None => {
                    return Err(ApiError::encoding(
                        descriptor.name(),
                        format!("missing required path parameter '{name}'"),
                    ));
                }
            },
        }
    }
    Ok(parts.join("/"))
}

fn encode_path_value(endpoint: &str, name: &str, value: &ParamValue) -> Result<String, ApiError> {
    let raw = value.to_wire();
    if raw.is_empty() || raw == "." || raw == ".." {
        return Err(ApiError::encoding(
            endpoint,
            format!("path parameter '{name}' cannot be {raw:?}"),
        ));
    }
    Ok(utf8_percent_encode(&raw, COMPONENT).to_string())
}

/// Build the query string (without the leading `?`).
///
/// Fixed template pairs come first, then declared parameters in declaration
/// order. Repeated parameters emit one pair per element in the bound order;
/// absent optional parameters emit nothing.
pub(crate) fn render_query(
    descriptor: &EndpointDescriptor,
    bound: &[(&'static str, ParamValue)],
) -> Result<String, ApiError> {
    let mut pairs: Vec<String> = descriptor
        .fixed_query()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    for spec in descriptor.query_params() {
        match lookup(bound, spec.name) {
            Some(ParamValue::List(items)) => {
                for item in items {
                    pairs.push(encode_pair(spec.name, item));
                }
            }
            Some(value) => pairs.push(encode_pair(spec.name, value)),
            None if spec.required => {
                return Err(ApiError::encoding(
                    descriptor.name(),
                    format!("missing required query parameter '{}'", spec.name),
                ));
            }
            None => {}
        }
    }
    Ok(pairs.join("&"))
}

fn encode_pair(name: &str, value: &ParamValue) -> String {
    format!(
        "{}={}",
        utf8_percent_encode(name, COMPONENT),
        utf8_percent_encode(&value.to_wire(), COMPONENT)
    )
}

fn lookup<'a>(bound: &'a [(&'static str, ParamValue)], name: &str) -> Option<&'a ParamValue> {
    bound.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
}

//! Call-site binding and request assembly.
//!
//! A [`CallBuilder`] collects arguments for one endpoint and records the
//! first binding error instead of failing immediately, so typed wrappers can
//! stay a single expression. [`CallBuilder::bind`] turns the arguments into a
//! [`BoundCall`]; [`BoundCall::to_request`] resolves it into the exact
//! [`HttpRequest`] that goes on the wire. Sending spawns the dispatch and
//! returns a [`CallHandle`] straight away.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::body::{encode_body, RequestBody};
use crate::config::{ClientConfig, API_VERSION_HEADER};
use crate::descriptor::{BodyKind, EndpointDescriptor};
use crate::dispatcher::{ApiResponse, CallHandle, Canceller, Dispatcher};
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::params::{check_binding, render_path, render_query, IntoParam, ParamValue};
use crate::transport::{AuthProvider, Transport};

/// Everything a call needs besides its own arguments.
pub(crate) struct Context {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) default_headers: Vec<(String, String)>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) auth: Arc<dyn AuthProvider>,
}

impl Context {
    pub(crate) fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        let mut default_headers = config.default_headers.clone();
        if let Some(version) = &config.api_version {
            default_headers.push((API_VERSION_HEADER.to_string(), version.clone()));
        }
        Ok(Self {
            base_url: config.base_url()?,
            timeout: config.timeout,
            default_headers,
            transport,
            auth,
        })
    }
}

/// An endpoint with all of its arguments bound and checked.
#[derive(Debug, Clone)]
pub struct BoundCall {
    descriptor: Arc<EndpointDescriptor>,
    path: Vec<(&'static str, ParamValue)>,
    query: Vec<(&'static str, ParamValue)>,
    body: Option<RequestBody>,
}

impl BoundCall {
    pub fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }

    /// Resolve into a request under `base_url`, with `extra_headers` after
    /// the endpoint's own.
    ///
    /// Deterministic: the same call and configuration always produce the
    /// same URL and headers. Only multipart boundaries vary.
    pub fn to_request(
        &self,
        base_url: &Url,
        extra_headers: &[(String, String)],
    ) -> Result<HttpRequest, ApiError> {
        let descriptor = &*self.descriptor;
        let mut url = base_url.as_str().to_string();
        url.push_str(&render_path(descriptor, &self.path)?);
        let query = render_query(descriptor, &self.query)?;
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let encoded = encode_body(descriptor, self.body.as_ref())?;
        let mut headers: Vec<(String, String)> =
            Vec::with_capacity(descriptor.headers().len() + extra_headers.len() + 1);
        for (name, value) in descriptor.headers() {
            let replaced = name.eq_ignore_ascii_case("content-type")
                && encoded.as_ref().is_some_and(|b| !b.content_type.eq_ignore_ascii_case(value));
            if !replaced {
                headers.push((name.to_string(), value.to_string()));
            }
        }
        if let Some(body) = &encoded {
            if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-type")) {
                headers.push(("Content-Type".to_string(), body.content_type.clone()));
            }
        }
        headers.extend(extra_headers.iter().cloned());

        Ok(HttpRequest {
            method: descriptor.method(),
            url,
            headers,
            body: encoded.map(|b| b.bytes),
        })
    }
}

/// Argument collector for one call.
pub struct CallBuilder {
    ctx: Arc<Context>,
    descriptor: Option<Arc<EndpointDescriptor>>,
    path: Vec<(&'static str, ParamValue)>,
    query: Vec<(&'static str, ParamValue)>,
    body: Option<RequestBody>,
    timeout: Option<Duration>,
    error: Option<ApiError>,
}

impl CallBuilder {
    pub(crate) fn new(ctx: Arc<Context>, descriptor: Arc<EndpointDescriptor>) -> Self {
        Self {
            ctx,
            descriptor: Some(descriptor),
            path: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            error: None,
        }
    }

    pub(crate) fn failed(ctx: Arc<Context>, error: ApiError) -> Self {
        Self {
            ctx,
            descriptor: None,
            path: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            error: Some(error),
        }
    }

    /// Bind a path parameter. `None` leaves it unbound.
    pub fn path(mut self, name: &str, value: impl IntoParam) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.bind_param(name, value.into_param(), true) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Bind a query parameter. `None` and empty lists emit nothing.
    pub fn query(mut self, name: &str, value: impl IntoParam) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.bind_param(name, value.into_param(), false) {
                self.error = Some(err);
            }
        }
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, value: &B) -> Self {
        match RequestBody::json(value) {
            Ok(body) => self.body = Some(body),
            Err(e) => {
                if self.error.is_none() {
                    let endpoint = self.descriptor.as_ref().map_or("unknown", |d| d.name());
                    self.error = Some(ApiError::encoding(endpoint, e.to_string()));
                }
            }
        }
        self
    }

    /// Override the configured timeout for this call only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn bind_param(
        &mut self,
        name: &str,
        value: Option<ParamValue>,
        in_path: bool,
    ) -> Result<(), ApiError> {
        let Some(descriptor) = &self.descriptor else {
            return Ok(());
        };
        let spec = if in_path {
            descriptor.path_param(name)
        } else {
            descriptor.query_param(name)
        };
        let Some(spec) = spec else {
            let position = if in_path { "path" } else { "query" };
            return Err(ApiError::encoding(
                descriptor.name(),
                format!("unknown {position} parameter '{name}'"),
            ));
        };
        let Some(value) = value else {
            return Ok(());
        };
        check_binding(descriptor.name(), spec, &value)?;

        let bound = if in_path { &mut self.path } else { &mut self.query };
        if bound.iter().any(|(k, _)| *k == spec.name) {
            return Err(ApiError::encoding(
                descriptor.name(),
                format!("parameter '{name}' bound twice"),
            ));
        }
        bound.push((spec.name, value));
        Ok(())
    }

    /// Check required arguments and freeze the call.
    pub fn bind(self) -> Result<BoundCall, ApiError> {
        let (descriptor, path, query, body) = self.into_parts()?;
        Ok(BoundCall {
            descriptor,
            path,
            query,
            body,
        })
    }

    #[allow(clippy::type_complexity)]
    fn into_parts(
        self,
    ) -> Result<
        (
            Arc<EndpointDescriptor>,
            Vec<(&'static str, ParamValue)>,
            Vec<(&'static str, ParamValue)>,
            Option<RequestBody>,
        ),
        ApiError,
    > {
        if let Some(err) = self.error {
            return Err(err);
        }
        let Some(descriptor) = self.descriptor else {
            return Err(ApiError::configuration("unknown", "call has no endpoint"));
        };
        let missing = descriptor
            .path_params()
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.name)
            .chain(
                descriptor
                    .query_params()
                    .iter()
                    .filter(|spec| spec.required)
                    .map(|spec| spec.name),
            )
            .find(|name| !self.path.iter().chain(self.query.iter()).any(|(k, _)| k == name));
        if let Some(name) = missing {
            return Err(ApiError::encoding(
                descriptor.name(),
                format!("missing required parameter '{name}'"),
            ));
        }
        if self.body.is_none() && *descriptor.body() != BodyKind::None {
            return Err(ApiError::encoding(descriptor.name(), "missing request body"));
        }
        Ok((descriptor, self.path, self.query, self.body))
    }

    /// Dispatch and yield the decoded body.
    pub fn send<T: DeserializeOwned + Send + 'static>(self) -> CallHandle<T> {
        self.dispatch(|response: ApiResponse<T>| response.value)
    }

    /// Dispatch and yield status and headers alongside the decoded body.
    pub fn send_with_response<T>(self) -> CallHandle<ApiResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.dispatch(|response: ApiResponse<T>| response)
    }

    fn dispatch<T, U>(self, finish: fn(ApiResponse<T>) -> U) -> CallHandle<U>
    where
        T: DeserializeOwned + Send + 'static,
        U: Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        let timeout = self.timeout.unwrap_or(ctx.timeout);
        let resolved = self
            .bind()
            .and_then(|call| Ok((call.to_request(&ctx.base_url, &ctx.default_headers)?, call)));
        let (mut request, call) = match resolved {
            Ok(resolved) => resolved,
            Err(err) => {
                debug!(error = %err, "call rejected before dispatch");
                return CallHandle::ready(Err(err));
            }
        };
        let endpoint = call.descriptor.name();
        let response_kind = call.descriptor.response();

        let cancel = Canceller::new();
        let token = cancel.clone();
        CallHandle::spawn(cancel, async move {
            if token.is_cancelled() {
                return None;
            }
            let auth = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(endpoint, "cancelled while authenticating");
                    return None;
                }
                auth = tokio::time::timeout(timeout, ctx.auth.headers()) => auth,
            };
            match auth {
                Ok(Ok(headers)) => request.headers.extend(headers),
                Ok(Err(message)) => {
                    debug!(endpoint, "authentication hook failed");
                    return Some(Err(ApiError::Auth(message)));
                }
                Err(_) => {
                    debug!(endpoint, ?timeout, "authentication hook timed out");
                    return Some(Err(ApiError::Timeout {
                        endpoint: endpoint.to_string(),
                        after: timeout,
                    }));
                }
            }
            let dispatcher = Dispatcher::new(
                endpoint,
                request,
                response_kind,
                timeout,
                Arc::clone(&ctx.transport),
                token,
            );
            dispatcher.run::<T>().await.map(|outcome| outcome.map(finish))
        })
    }
}

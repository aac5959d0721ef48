//! Asynchronous execution of one resolved request.
//!
//! # Design
//! A [`Dispatcher`] is created per attempt and owns its request and transport
//! handle exclusively. It walks `Built -> InFlight -> Succeeded | Failed`,
//! with `Cancelled` reachable from any non-terminal state. Timeouts and
//! cancellation both work by dropping the transport future, which abandons
//! the attempt.
//!
//! The caller sees a [`CallHandle`]: a future that resolves exactly once.
//! Cancelling it (explicitly, through a [`Canceller`], or by dropping it)
//! guarantees no transport result or decoded value is delivered afterwards.
//! Decoding never starts once cancellation has been requested.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::{oneshot, Notify};
use tracing::{debug, error, warn, Instrument};

use crate::body::decode_body;
use crate::descriptor::ResponseKind;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Lifecycle of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Built,
    InFlight,
    Succeeded,
    Failed,
    Cancelled,
}

impl DispatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DispatchState::Succeeded | DispatchState::Failed | DispatchState::Cancelled)
    }

    /// Outcomes are only reachable from `InFlight`; nothing leaves a
    /// terminal state.
    pub fn can_transition_to(self, next: DispatchState) -> bool {
        use DispatchState::*;
        matches!(
            (self, next),
            (Built, InFlight)
                | (Built, Cancelled)
                | (InFlight, Succeeded)
                | (InFlight, Failed)
                | (InFlight, Cancelled)
        )
    }
}

/// Shared cancellation flag between a handle and its dispatch task.
#[derive(Debug, Clone, Default)]
pub struct Canceller {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl Canceller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`Self::cancel`] has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Status, headers and decoded value of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub value: T,
}

impl<T> ApiResponse<T> {
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::http::find_header(&self.headers, name)
    }
}

/// Executes one request attempt against the transport.
pub struct Dispatcher {
    endpoint: &'static str,
    state: DispatchState,
    request: HttpRequest,
    response_kind: ResponseKind,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    cancel: Canceller,
}

impl Dispatcher {
    pub fn new(
        endpoint: &'static str,
        request: HttpRequest,
        response_kind: ResponseKind,
        timeout: Duration,
        transport: Arc<dyn Transport>,
        cancel: Canceller,
    ) -> Self {
        Self {
            endpoint,
            state: DispatchState::Built,
            request,
            response_kind,
            timeout,
            transport,
            cancel,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Run the attempt. Returns `None` when the call was cancelled, in which
    /// case nothing may be delivered to the caller.
    pub async fn run<T: DeserializeOwned>(self) -> Option<Result<ApiResponse<T>, ApiError>> {
        let span = tracing::info_span!(
            "dispatch",
            endpoint = self.endpoint,
            method = %self.request.method,
        );
        self.execute().instrument(span).await
    }

    async fn execute<T: DeserializeOwned>(mut self) -> Option<Result<ApiResponse<T>, ApiError>> {
        if self.cancel.is_cancelled() {
            self.advance(DispatchState::Cancelled);
            return None;
        }

        self.advance(DispatchState::InFlight);
        let placeholder = placeholder_request(&self.request);
        let request = std::mem::replace(&mut self.request, placeholder);
        let transport = Arc::clone(&self.transport);
        let attempt = tokio::time::timeout(self.timeout, transport.send(request));

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.advance(DispatchState::Cancelled);
                debug!("cancelled while in flight; attempt abandoned");
                return None;
            }
            result = attempt => result,
        };

        let response = match result {
            Err(_) => {
                self.advance(DispatchState::Failed);
                warn!(timeout = ?self.timeout, "request timed out; attempt abandoned");
                return Some(Err(ApiError::Timeout {
                    endpoint: self.endpoint.to_string(),
                    after: self.timeout,
                }));
            }
            Ok(Err(err)) => {
                self.advance(DispatchState::Failed);
                warn!(error = %err, "transport failure");
                return Some(Err(ApiError::Transport(err)));
            }
            Ok(Ok(response)) => response,
        };

        if self.cancel.is_cancelled() {
            self.advance(DispatchState::Cancelled);
            debug!(status = response.status, "cancelled before decoding; response discarded");
            return None;
        }

        let outcome = self.complete(response);
        self.advance(if outcome.is_ok() {
            DispatchState::Succeeded
        } else {
            DispatchState::Failed
        });
        Some(outcome)
    }

    fn complete<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<ApiResponse<T>, ApiError> {
        let status = response.status;
        match status {
            200..=299 => {
                let value = decode_body(self.endpoint, self.response_kind, &response.body)
                    .and_then(|decoded| decoded.into_typed(self.endpoint))
                    .inspect_err(|err| {
                        error!(
                            status,
                            error = %err,
                            "response does not match the endpoint contract"
                        )
                    })?;
                Ok(ApiResponse {
                    status,
                    headers: response.headers,
                    value,
                })
            }
            400..=499 => {
                debug!(status, "client error");
                Err(ApiError::Client {
                    status,
                    body: response.body_text(),
                })
            }
            500..=599 => {
                warn!(status, "server error");
                Err(ApiError::Server {
                    status,
                    body: response.body_text(),
                })
            }
            _ => {
                error!(status, "unexpected status");
                Err(ApiError::decoding(self.endpoint, format!("unexpected status {status}")))
            }
        }
    }

    fn advance(&mut self, next: DispatchState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {next:?}",
            self.state
        );
        debug!(from = ?self.state, to = ?next, "transition");
        self.state = next;
    }
}

/// Body-less stand-in left behind once the real request has moved into the
/// transport.
fn placeholder_request(request: &HttpRequest) -> HttpRequest {
    HttpRequest {
        method: request.method,
        url: request.url.clone(),
        headers: Vec::new(),
        body: None,
    }
}

/// Handle to an in-flight call; resolves to its single outcome.
///
/// Dropping the handle cancels the call.
pub struct CallHandle<T> {
    inner: HandleInner<T>,
    cancel: Canceller,
}

enum HandleInner<T> {
    Ready(Option<Result<T, ApiError>>),
    Waiting(oneshot::Receiver<Result<T, ApiError>>),
}

// The outcome is never pinned structurally.
impl<T> Unpin for CallHandle<T> {}

impl<T: Send + 'static> CallHandle<T> {
    /// A handle that is already complete, e.g. because binding failed.
    pub(crate) fn ready(outcome: Result<T, ApiError>) -> Self {
        Self {
            inner: HandleInner::Ready(Some(outcome)),
            cancel: Canceller::new(),
        }
    }

    /// Run `work` on the current tokio runtime. `work` yields `None` when it
    /// observed cancellation.
    pub(crate) fn spawn<F>(cancel: Canceller, work: F) -> Self
    where
        F: Future<Output = Option<Result<T, ApiError>>> + Send + 'static,
    {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                return Self::ready(Err(ApiError::configuration(
                    "runtime",
                    "calls must be issued from within a tokio runtime",
                )))
            }
        };
        let (tx, rx) = oneshot::channel();
        let token = cancel.clone();
        runtime.spawn(async move {
            if let Some(outcome) = work.await {
                if !token.is_cancelled() {
                    let _ = tx.send(outcome);
                }
            }
        });
        Self {
            inner: HandleInner::Waiting(rx),
            cancel,
        }
    }
}

impl<T> CallHandle<T> {
    /// Abandon the call. No outcome will be delivered.
    pub fn cancel(self) {
        self.cancel.cancel();
    }

    /// Detached cancellation, for code that does not own the handle.
    pub fn canceller(&self) -> Canceller {
        self.cancel.clone()
    }
}

impl<T> Future for CallHandle<T> {
    type Output = Result<T, ApiError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(ApiError::Cancelled));
        }
        match &mut this.inner {
            HandleInner::Ready(slot) => {
                Poll::Ready(slot.take().unwrap_or(Err(ApiError::Cancelled)))
            }
            HandleInner::Waiting(rx) => {
                let outcome = match Pin::new(rx).poll(cx) {
                    Poll::Ready(Ok(outcome)) => outcome,
                    Poll::Ready(Err(_)) => Err(ApiError::Cancelled),
                    Poll::Pending => return Poll::Pending,
                };
                this.inner = HandleInner::Ready(None);
                Poll::Ready(outcome)
            }
        }
    }
}

impl<T> Drop for CallHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use serde_json::Value;
    use tracing_test::traced_test;

    use super::*;
    use crate::http::HttpMethod;
    use crate::transport::{TransportError, TransportErrorKind};

    /// Answers every request with a fixed response after a delay, and
    /// records whether an attempt was dropped before finishing.
    struct Delayed {
        delay: Duration,
        response: Result<HttpResponse, TransportErrorKind>,
        abandoned: Arc<AtomicUsize>,
        before_reply: Option<Canceller>,
    }

    struct AbandonGuard(Arc<AtomicUsize>, bool);

    impl Drop for AbandonGuard {
        fn drop(&mut self) {
            if !self.1 {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[async_trait]
    impl Transport for Delayed {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut guard = AbandonGuard(self.abandoned.clone(), false);
            tokio::time::sleep(self.delay).await;
            guard.1 = true;
            if let Some(cancel) = &self.before_reply {
                cancel.cancel();
            }
            self.response
                .clone()
                .map_err(|kind| TransportError::new(kind, "simulated"))
        }
    }

    fn ok(status: u16, body: &str) -> Result<HttpResponse, TransportErrorKind> {
        Ok(HttpResponse {
            status,
            headers: vec![("X-Request-Id".to_string(), "r1".to_string())],
            body: body.as_bytes().to_vec(),
        })
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/api/events/42".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    fn dispatcher(transport: Delayed, kind: ResponseKind, cancel: Canceller) -> Dispatcher {
        Dispatcher::new(
            "get_event",
            request(),
            kind,
            Duration::from_secs(5),
            Arc::new(transport),
            cancel,
        )
    }

    /// Run a dispatcher behind a handle, keeping only the decoded value.
    fn spawn_handle<T>(d: Dispatcher, cancel: Canceller) -> CallHandle<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        CallHandle::spawn(cancel, async move {
            d.run::<T>().await.map(|r| r.map(|resp| resp.value))
        })
    }

    fn transport(
        delay_ms: u64,
        response: Result<HttpResponse, TransportErrorKind>,
    ) -> (Delayed, Arc<AtomicUsize>) {
        let abandoned = Arc::new(AtomicUsize::new(0));
        (
            Delayed {
                delay: Duration::from_millis(delay_ms),
                response,
                abandoned: abandoned.clone(),
                before_reply: None,
            },
            abandoned,
        )
    }

    #[test]
    fn transitions_never_skip_in_flight() {
        use DispatchState::*;
        assert!(Built.can_transition_to(InFlight));
        assert!(!Built.can_transition_to(Succeeded));
        assert!(!Built.can_transition_to(Failed));
        assert!(InFlight.can_transition_to(Succeeded));
        assert!(InFlight.can_transition_to(Failed));
        assert!(InFlight.can_transition_to(Cancelled));
        for terminal in [Succeeded, Failed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Built, InFlight, Succeeded, Failed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[tokio::test]
    async fn success_decodes_body_and_keeps_headers() {
        let (t, _) = transport(0, ok(200, r#"{"id":42}"#));
        let outcome = dispatcher(t, ResponseKind::JsonObject, Canceller::new())
            .run::<Value>()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.value["id"], 42);
        assert_eq!(outcome.header("x-request-id"), Some("r1"));
    }

    #[tokio::test]
    async fn status_classes_map_to_errors() {
        let (t, _) = transport(0, ok(404, "no such event"));
        let err = dispatcher(t, ResponseKind::JsonObject, Canceller::new())
            .run::<Value>()
            .await
            .unwrap()
            .unwrap_err();
        assert!(
            matches!(err, ApiError::Client { status: 404, ref body } if body == "no such event")
        );

        let (t, _) = transport(0, ok(503, "busy"));
        let err = dispatcher(t, ResponseKind::JsonObject, Canceller::new())
            .run::<Value>()
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 503, .. }));

        let (t, _) = transport(0, ok(304, ""));
        let err = dispatcher(t, ResponseKind::None, Canceller::new())
            .run::<()>()
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ApiError::Decoding { .. }));
    }

    #[tokio::test]
    async fn transport_failure_carries_cause() {
        let (t, _) = transport(0, Err(TransportErrorKind::Reset));
        let err = dispatcher(t, ResponseKind::None, Canceller::new())
            .run::<()>()
            .await
            .unwrap()
            .unwrap_err();
        match err {
            ApiError::Transport(cause) => assert_eq!(cause.kind, TransportErrorKind::Reset),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_abandons_attempt() {
        let (t, abandoned) = transport(60_000, ok(200, "{}"));
        let d = Dispatcher::new(
            "get_event",
            request(),
            ResponseKind::JsonObject,
            Duration::from_millis(100),
            Arc::new(t),
            Canceller::new(),
        );
        let err = d.run::<Value>().await.unwrap().unwrap_err();
        assert!(
            matches!(err, ApiError::Timeout { after, .. } if after == Duration::from_millis(100))
        );
        assert_eq!(abandoned.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_in_flight_releases_transport() {
        let (t, abandoned) = transport(10_000, ok(200, "{}"));
        let cancel = Canceller::new();
        let d = dispatcher(t, ResponseKind::JsonObject, cancel.clone());
        let task = tokio::spawn(d.run::<Value>());
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
        assert!(task.await.unwrap().is_none());
        assert_eq!(abandoned.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_before_decoding_suppresses_outcome() {
        let cancel = Canceller::new();
        let (mut t, _) = transport(0, ok(200, "not json"));
        t.before_reply = Some(cancel.clone());
        let outcome = dispatcher(t, ResponseKind::JsonObject, cancel).run::<Value>().await;
        assert!(outcome.is_none(), "no decoding error may surface after cancellation");
    }

    #[tokio::test]
    async fn cancelled_before_start_never_sends() {
        let cancel = Canceller::new();
        cancel.cancel();
        let (t, abandoned) = transport(0, ok(200, "{}"));
        let d = dispatcher(t, ResponseKind::JsonObject, cancel);
        assert_eq!(d.state(), DispatchState::Built);
        assert!(d.run::<Value>().await.is_none());
        assert_eq!(abandoned.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handle_delivers_once_then_reports_nothing_more() {
        let (t, _) = transport(0, ok(200, "7"));
        let cancel = Canceller::new();
        let d = dispatcher(t, ResponseKind::JsonScalar, cancel.clone());
        let mut handle: CallHandle<i64> = spawn_handle(d, cancel);
        assert_eq!((&mut handle).await.unwrap(), 7);
        assert!(matches!((&mut handle).await, Err(ApiError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn detached_cancel_yields_no_outcome() {
        let (t, abandoned) = transport(1_000, ok(200, "{}"));
        let cancel = Canceller::new();
        let d = dispatcher(t, ResponseKind::JsonObject, cancel.clone());
        let handle: CallHandle<Value> = spawn_handle(d, cancel);
        handle.canceller().cancel();
        assert!(matches!(handle.await, Err(ApiError::Cancelled)));
        tokio::time::sleep(Duration::from_millis(5)).await;
        // Cancelled before the task first ran, so nothing was sent.
        assert_eq!(abandoned.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn detached_cancel_after_send_abandons_attempt() {
        let (t, abandoned) = transport(1_000, ok(200, "{}"));
        let cancel = Canceller::new();
        let d = dispatcher(t, ResponseKind::JsonObject, cancel.clone());
        let handle: CallHandle<Value> = spawn_handle(d, cancel);
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.canceller().cancel();
        assert!(matches!(handle.await, Err(ApiError::Cancelled)));
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(abandoned.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn spawn_outside_runtime_fails_cleanly() {
        let handle: CallHandle<()> = CallHandle::spawn(Canceller::new(), async { Some(Ok(())) });
        let outcome = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(handle);
        assert!(matches!(outcome, Err(ApiError::Configuration { .. })));
    }

    #[tokio::test]
    #[traced_test]
    async fn shape_mismatch_is_logged_loudly() {
        let (t, _) = transport(0, ok(200, "[1, 2]"));
        let outcome = dispatcher(t, ResponseKind::JsonObject, Canceller::new())
            .run::<Value>()
            .await
            .unwrap();
        assert!(matches!(outcome, Err(ApiError::Decoding { .. })));
        assert!(logs_contain("response does not match the endpoint contract"));
    }
}

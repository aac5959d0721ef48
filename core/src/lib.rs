//! Endpoint dispatch core for the ride platform API.
//!
//! # Overview
//! Every remote operation is declared once as an [`EndpointDescriptor`]:
//! verb, path template, parameters, static headers, body encoding and
//! response shape. A call binds arguments to a descriptor, is resolved into
//! an exact [`HttpRequest`], and runs on a spawned dispatch task that hands
//! the caller a [`CallHandle`]. The handle resolves once with either the
//! decoded value or a classified [`ApiError`], and can be cancelled at any
//! time.
//!
//! # Design
//! - Resolution ([`BoundCall::to_request`]) and decoding (`body::decode_body`)
//!   are pure; only the [`Transport`] touches the network, so both halves
//!   are testable without a server.
//! - Descriptors are validated when the [`Catalogue`] is built. A malformed
//!   declaration is a configuration error, never a runtime surprise.
//! - Retries belong to the caller ([`with_retry`]); the dispatcher sends
//!   each attempt exactly once.
//! - Response models are supplied by the caller as any `serde` type.

pub mod api;
pub mod body;
pub mod call;
pub mod catalogue;
pub mod config;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod paging;
pub mod params;
pub mod retry;
pub mod transport;
pub mod wire;

pub use api::{ClubSearch, EventFeedQuery, Payload, RideApi};
pub use body::{Part, RequestBody};
pub use call::{BoundCall, CallBuilder};
pub use catalogue::Catalogue;
pub use config::ClientConfig;
pub use descriptor::{BodyKind, EndpointDescriptor, ResponseKind, ValueKind};
pub use dispatcher::{ApiResponse, CallHandle, Canceller, DispatchState, Dispatcher};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use paging::collect_pages;
pub use retry::{with_retry, RetryPolicy};
pub use transport::{
    AuthProvider, BearerToken, NoAuth, ReqwestTransport, Transport, TransportError,
    TransportErrorKind,
};
pub use wire::{
    ActivityFeedType, ClubImageType, ClubMemberCount, ClubMemberStatus, ClubsSortDirection,
    ClubsSortField, EventTypeV2, Sport, WireEnum,
};

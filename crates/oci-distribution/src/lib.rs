//! Request construction and response interpretation for OCI registries.
//!
//! A [`Client`] turns path templates such as `/v2/<name>/blobs/<digest>` into
//! ready [`Request`] values, answers authentication challenges, and reads
//! registry documents out of [`Response`] values. Sending requests is left to
//! the caller's HTTP stack.
//!
//! Digests given for a `<digest>` slot are parsed strictly first; a request is
//! never built around a digest that does not parse.

pub mod auth;
pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{AuthChallenge, AuthScheme};
pub use client::Client;
pub use config::{ClientConfig, DEFAULT_USER_AGENT};
pub use documents::{ErrorInfo, ErrorResponse, RepositoryList, TagList};
pub use error::{DistributionError, DistributionResult};
pub use request::{Method, Request, RequestOptions};
pub use response::Response;

/// Registry API endpoint templates.
pub mod endpoints {
    pub const BASE: &str = "/v2/";
    pub const CATALOG: &str = "/v2/_catalog";
    pub const TAGS: &str = "/v2/<name>/tags/list";
    pub const MANIFEST: &str = "/v2/<name>/manifests/<reference>";
    pub const BLOB: &str = "/v2/<name>/blobs/<digest>";
    pub const UPLOADS: &str = "/v2/<name>/blobs/uploads/";
    pub const UPLOAD_SESSION: &str = "/v2/<name>/blobs/uploads/<session_id>";
}

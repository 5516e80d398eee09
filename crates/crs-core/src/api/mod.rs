//! REST API client module for the course-registration service.
//!
//! This module provides the `ApiClient` for calling the API, the
//! `RequestDescriptor` describing one call, the `Resource` collections it
//! exposes, and the normalized `ApiError` every failure is reported as.
//!
//! The API uses JWT bearer token authentication obtained from `/login`.

pub mod client;
pub mod error;
pub mod request;
pub mod resources;

pub use client::{parse_body, ApiClient};
pub use error::{ApiError, ErrorKind, TRANSPORT_FAILURE_STATUS};
pub use request::{Method, RequestDescriptor};
pub use resources::{Resource, UnknownResource};

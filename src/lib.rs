//! This crate is a small, fluent configuration layer for synchronous HTTP
//! requests. A request is built through chained configuration calls on a
//! [`RequestBuilder`] and dispatched with one of the verb methods, returning
//! the raw response body as text.
//!
//! Configuration is grouped into five facets: agent, referer, redirect, ssl
//! and cookie. Each facet the caller does not configure explicitly gets a
//! default applied exactly once, right before dispatch, in a fixed order so
//! the assembled request is always reproducible.
//!
//! The network itself lives behind the [`Transport`] trait. The default
//! transport is backed by libcurl; any other implementation can be injected
//! with [`RequestBuilder::with_transport`]. Transport-level failures (DNS,
//! TLS, timeouts) are returned as error values the caller can branch on; an
//! HTTP error status is not a failure and its body is returned as-is.
//!
//! # Example
//! ```no_run
//! use confetch::{BodyFormat, RequestBuilder};
//!
//! let body = RequestBuilder::new()
//!     .agent("confetch-example/0.1")
//!     .query(&[("wd", "hello")], BodyFormat::Form)
//!     .get("http://example.com/s")?;
//! println!("{}", body);
//! # Ok::<(), confetch::Error>(())
//! ```

#[macro_use]
extern crate log;

mod error;
mod request;
mod transport;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::request::{BodyFormat, Method, RequestBuilder};
pub use crate::transport::{CurlTransport, OptionKey, Transport, TransportError, TransportOption};

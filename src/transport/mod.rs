//! The transport boundary.
//!
//! A [`Transport`] is the thing that actually moves bytes over HTTP. The
//! request pipeline only assembles typed options and raw header lines and
//! hands them over; everything network-related lives behind this trait. The
//! production implementation is [`CurlTransport`], but any implementation can
//! be injected through `RequestBuilder::with_transport`, which is how the
//! pipeline is tested without a network.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use crate::request::Method;

mod curl_impl;

pub use curl_impl::CurlTransport;

/// A single typed configuration value for a transport.
///
/// Options are keyed: setting an option with the same [`OptionKey`] twice
/// keeps the first position but replaces the value. Raw header lines are not
/// options and are only ever appended.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TransportOption {
    /// HTTP method of the request.
    Method(Method),
    /// Full request URL, including any query string.
    Url(String),
    /// Request body bytes.
    Body(Vec<u8>),
    /// Value of the User-Agent header.
    UserAgent(String),
    /// Value of the Referer header.
    Referer(String),
    /// Let the transport fill in the Referer header when following redirects.
    AutoReferer(bool),
    /// Whether 3xx responses are followed.
    FollowRedirects(bool),
    /// Maximum number of redirections to follow.
    MaxRedirects(u32),
    /// Whether the peer's TLS certificate is verified.
    VerifyPeer(bool),
    /// Whether the certificate must match the full request hostname.
    VerifyHost(bool),
    /// Directory holding trusted CA certificates.
    CaPath(String),
    /// Value of the Cookie header.
    Cookie(String),
    /// Start a fresh cookie session, ignoring stored session cookies.
    SessionCookies(bool),
    /// Maximum time allowed to establish the connection.
    ConnectTimeout(Duration),
    /// Maximum time allowed for the whole request.
    Timeout(Duration),
    /// Emit verbose transfer diagnostics to the log.
    Verbose(bool),
}

/// Identifies a transport option independently of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum OptionKey {
    Method,
    Url,
    Body,
    UserAgent,
    Referer,
    AutoReferer,
    FollowRedirects,
    MaxRedirects,
    VerifyPeer,
    VerifyHost,
    CaPath,
    Cookie,
    SessionCookies,
    ConnectTimeout,
    Timeout,
    Verbose,
}

impl TransportOption {
    /// The key this option is stored and deduplicated under.
    pub fn key(&self) -> OptionKey {
        match self {
            TransportOption::Method(_) => OptionKey::Method,
            TransportOption::Url(_) => OptionKey::Url,
            TransportOption::Body(_) => OptionKey::Body,
            TransportOption::UserAgent(_) => OptionKey::UserAgent,
            TransportOption::Referer(_) => OptionKey::Referer,
            TransportOption::AutoReferer(_) => OptionKey::AutoReferer,
            TransportOption::FollowRedirects(_) => OptionKey::FollowRedirects,
            TransportOption::MaxRedirects(_) => OptionKey::MaxRedirects,
            TransportOption::VerifyPeer(_) => OptionKey::VerifyPeer,
            TransportOption::VerifyHost(_) => OptionKey::VerifyHost,
            TransportOption::CaPath(_) => OptionKey::CaPath,
            TransportOption::Cookie(_) => OptionKey::Cookie,
            TransportOption::SessionCookies(_) => OptionKey::SessionCookies,
            TransportOption::ConnectTimeout(_) => OptionKey::ConnectTimeout,
            TransportOption::Timeout(_) => OptionKey::Timeout,
            TransportOption::Verbose(_) => OptionKey::Verbose,
        }
    }
}

impl OptionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::Method => "method",
            OptionKey::Url => "url",
            OptionKey::Body => "body",
            OptionKey::UserAgent => "user-agent",
            OptionKey::Referer => "referer",
            OptionKey::AutoReferer => "auto-referer",
            OptionKey::FollowRedirects => "follow-redirects",
            OptionKey::MaxRedirects => "max-redirects",
            OptionKey::VerifyPeer => "verify-peer",
            OptionKey::VerifyHost => "verify-host",
            OptionKey::CaPath => "ca-path",
            OptionKey::Cookie => "cookie",
            OptionKey::SessionCookies => "session-cookies",
            OptionKey::ConnectTimeout => "connect-timeout",
            OptionKey::Timeout => "timeout",
            OptionKey::Verbose => "verbose",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capability to execute one assembled request.
///
/// An implementation receives every accumulated option and raw header line,
/// then executes synchronously. Failures at this level are connection, DNS,
/// TLS or timeout failures; an HTTP error status is a successful execution
/// and its body is returned like any other.
pub trait Transport {
    /// Apply a single typed option.
    fn set_option(&mut self, option: TransportOption) -> Result<(), TransportError>;

    /// Apply the raw header lines, replacing any previously set.
    fn set_headers(&mut self, lines: &[String]) -> Result<(), TransportError>;

    /// Execute the request and return the raw response body text.
    fn execute(&mut self) -> Result<String, TransportError>;
}

/// A failure reported by a transport, carrying its own description of what
/// went wrong.
#[derive(Debug)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new<S: Into<String>>(message: S) -> TransportError {
        TransportError {
            message: message.into(),
        }
    }

    /// The transport's description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for TransportError {}

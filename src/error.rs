use std::error::Error as StdError;
use std::fmt;
use std::result;

use crate::transport::TransportError;

/// Wrapper for the kinds of errors that can happen while configuring and
/// dispatching a request.
pub struct Error(Box<ErrorKind>);

/// The different kinds of errors that can happen.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The verb name given to `invoke` is not one of get, post, put, delete.
    ///
    /// No transport call is made when this error is returned.
    UnsupportedMethod(String),
    /// The request URL could not be parsed.
    InvalidUrl(url::ParseError),
    /// The staged payload could not be serialized to JSON.
    Json(serde_json::Error),
    /// The transport failed to execute the request. This covers connection,
    /// DNS, TLS and timeout failures, not HTTP error status codes.
    Transport(TransportError),
}

impl Error {
    /// Get a reference to the `ErrorKind` inside.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ErrorKind::UnsupportedMethod(verb) => write!(f, "unsupported request method: {}", verb),
            ErrorKind::InvalidUrl(err) => write!(f, "invalid url: {}", err),
            ErrorKind::Json(err) => write!(f, "cannot serialize payload to json: {}", err),
            ErrorKind::Transport(err) => write!(f, "transport error: {}", err),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.kind() {
            ErrorKind::InvalidUrl(err) => Some(err),
            ErrorKind::Json(err) => Some(err),
            ErrorKind::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        ErrorKind::InvalidUrl(err).into()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        ErrorKind::Json(err).into()
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Error {
        ErrorKind::Transport(err).into()
    }
}

pub type Result<T = ()> = result::Result<T, Error>;

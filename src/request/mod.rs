use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, ErrorKind, Result};
use crate::transport::{Transport, TransportOption};

mod builder;
/// Contains types to describe staged request payloads
pub mod payload;
mod settings;

pub use builder::RequestBuilder;
pub use payload::BodyFormat;

use payload::{cookie_string, Payload};
use settings::{Facet, FacetSettings, FacetState, FACET_ORDER};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// The set of HTTP methods a request can be dispatched with.
///
/// Verb names outside this set are rejected with
/// [`ErrorKind::UnsupportedMethod`](crate::ErrorKind::UnsupportedMethod)
/// before any request state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(verb: &str) -> Result<Method> {
        if verb.eq_ignore_ascii_case("get") {
            Ok(Method::Get)
        } else if verb.eq_ignore_ascii_case("post") {
            Ok(Method::Post)
        } else if verb.eq_ignore_ascii_case("put") {
            Ok(Method::Put)
        } else if verb.eq_ignore_ascii_case("delete") {
            Ok(Method::Delete)
        } else {
            Err(ErrorKind::UnsupportedMethod(verb.to_owned()).into())
        }
    }
}

/// The mutable state of one HTTP call as it moves through facet resolution,
/// body encoding and dispatch. Created fresh per call and discarded once the
/// transport returns.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    method: Method,
    url: Url,
    payload: Option<Payload>,
    settings: FacetSettings,
    options: Vec<TransportOption>,
    raw_headers: Vec<String>,
}

impl PendingRequest {
    pub fn new(
        method: Method,
        url: &str,
        payload: Option<Payload>,
        settings: FacetSettings,
    ) -> Result<PendingRequest> {
        let url = Url::parse(url)?;
        Ok(PendingRequest {
            method,
            url,
            payload,
            settings,
            options: Vec::new(),
            raw_headers: Vec::new(),
        })
    }

    /// Set a keyed option. The first write determines the option's position,
    /// later writes replace the value in place.
    fn set_option(&mut self, option: TransportOption) {
        let key = option.key();
        match self.options.iter_mut().find(|existing| existing.key() == key) {
            Some(slot) => *slot = option,
            None => self.options.push(option),
        }
    }

    /// Resolve every facet in the fixed order. Facets the caller configured
    /// contribute their configured values, the rest run their default path;
    /// either way each facet is applied exactly once.
    fn resolve_facets(&mut self) {
        for facet in FACET_ORDER {
            self.settings.mark_defaulted(facet);
            if self.settings.state(facet) == FacetState::DefaultApplied {
                trace!("facet {:?} using defaults", facet);
            }
            self.apply_facet(facet);
        }
    }

    fn apply_facet(&mut self, facet: Facet) {
        match facet {
            Facet::Agent => {
                if let Some(agent) = self.settings.agent.clone() {
                    self.set_option(TransportOption::UserAgent(agent));
                }
            }
            Facet::Referer => match self.settings.referer.clone() {
                Some(referer) => self.set_option(TransportOption::Referer(referer)),
                None => self.set_option(TransportOption::AutoReferer(true)),
            },
            Facet::Redirect => {
                self.set_option(TransportOption::FollowRedirects(self.settings.follow_redirects));
                self.set_option(TransportOption::MaxRedirects(self.settings.max_redirects));
            }
            Facet::Ssl => {
                let verify = self.settings.verify_tls;
                self.set_option(TransportOption::VerifyPeer(verify));
                self.set_option(TransportOption::VerifyHost(verify));
                if verify {
                    if let Some(ca_path) = self.settings.ca_path.clone() {
                        self.set_option(TransportOption::CaPath(ca_path));
                    }
                }
            }
            Facet::Cookie => {
                if self.settings.cookies.is_empty() {
                    self.set_option(TransportOption::SessionCookies(true));
                } else {
                    self.set_option(TransportOption::Cookie(cookie_string(&self.settings.cookies)));
                }
            }
        }
    }

    /// Encode the staged payload. On GET it merges into the URL's query
    /// string and the url option is re-set; on other methods it becomes the
    /// request body, as JSON with explicit Content-Type/Content-Length
    /// header lines or as form data.
    fn encode_body(&mut self) -> Result {
        let payload = match self.payload.take() {
            Some(payload) if !payload.is_empty() => payload,
            _ => return Ok(()),
        };

        if self.method == Method::Get {
            {
                let mut pairs = self.url.query_pairs_mut();
                for (key, value) in payload.pairs() {
                    pairs.append_pair(key, value);
                }
            }
            self.set_option(TransportOption::Url(self.url.to_string()));
        } else {
            match payload.format() {
                BodyFormat::Json => {
                    let body = payload.to_json()?;
                    self.raw_headers.push(format!("Content-Type: {}", JSON_CONTENT_TYPE));
                    self.raw_headers.push(format!("Content-Length: {}", body.len()));
                    self.set_option(TransportOption::Body(body.into_bytes()));
                }
                BodyFormat::Form => {
                    let body = payload.to_query_string();
                    self.set_option(TransportOption::Body(body.into_bytes()));
                }
            }
        }
        Ok(())
    }

    /// Run the remaining pipeline stages and execute on the given transport.
    ///
    /// A transport-level failure is surfaced as an error value, it never
    /// aborts. The response body is returned unmodified regardless of the
    /// HTTP status code.
    pub fn dispatch<T: Transport>(mut self, transport: &mut T) -> Result<String> {
        self.set_option(TransportOption::Method(self.method));
        self.set_option(TransportOption::Url(self.url.to_string()));
        self.resolve_facets();
        self.encode_body()?;
        self.set_option(TransportOption::ConnectTimeout(self.settings.connect_timeout));
        self.set_option(TransportOption::Timeout(self.settings.timeout));
        if self.settings.verbose {
            self.set_option(TransportOption::Verbose(true));
        }

        debug!("{} {}", self.method.as_str(), self.url);

        for option in self.options {
            trace!("option {}", option.key());
            transport.set_option(option).map_err(ErrorKind::Transport)?;
        }
        transport.set_headers(&self.raw_headers).map_err(ErrorKind::Transport)?;

        match transport.execute() {
            Ok(body) => {
                debug!("received {} bytes", body.len());
                Ok(body)
            }
            Err(err) => {
                debug!("transport failure: {}", err);
                Err(ErrorKind::Transport(err).into())
            }
        }
    }
}

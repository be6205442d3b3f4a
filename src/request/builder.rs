use std::borrow::Borrow;
use std::time::Duration;

use crate::error::Result;
use crate::request::payload::{collect_pairs, BodyFormat, Payload};
use crate::request::settings::{Facet, FacetSettings};
use crate::request::{Method, PendingRequest};
use crate::transport::{CurlTransport, Transport};

/// `RequestBuilder` is the main way of configuring and dispatching requests.
///
/// A builder is created with the `new` method, configured through chained
/// calls, and consumed by one of the verb methods (`get`, `post`, `put`,
/// `delete`) or by `invoke`. One builder makes exactly one request; for
/// concurrent requests, use independent builders.
///
/// Any facet left unconfigured gets its default applied right before
/// dispatch, in the fixed order agent, referer, redirect, ssl, cookie.
///
/// # Example
/// ```no_run
/// use confetch::{BodyFormat, RequestBuilder};
///
/// let body = RequestBuilder::new()
///     .query(&[("wd", "hello")], BodyFormat::Form)
///     .get("http://example.com/s")?;
/// # Ok::<(), confetch::Error>(())
/// ```
#[derive(Debug)]
pub struct RequestBuilder<T = CurlTransport> {
    transport: T,
    settings: FacetSettings,
    payload: Option<Payload>,
}

impl RequestBuilder<CurlTransport> {
    /// Create a builder backed by the default curl transport.
    ///
    /// The builder owns the transport handle for its whole lifetime; the
    /// handle is released when the builder is consumed or dropped.
    pub fn new() -> RequestBuilder<CurlTransport> {
        RequestBuilder::with_transport(CurlTransport::new())
    }
}

impl Default for RequestBuilder<CurlTransport> {
    fn default() -> RequestBuilder<CurlTransport> {
        RequestBuilder::new()
    }
}

impl<T: Transport> RequestBuilder<T> {
    /// Create a builder that dispatches through the given transport.
    pub fn with_transport(transport: T) -> RequestBuilder<T> {
        RequestBuilder {
            transport,
            settings: FacetSettings::default(),
            payload: None,
        }
    }

    /// Stage the request payload.
    ///
    /// On GET the pairs are merged into the URL's query string. On other
    /// methods they become the request body, encoded according to `format`.
    /// The same key can be used multiple times.
    ///
    /// # Example
    /// ```
    /// use confetch::BodyFormat;
    ///
    /// confetch::RequestBuilder::new().query(&[("name", "a")], BodyFormat::Json);
    /// ```
    pub fn query<P, K, V>(mut self, pairs: P, format: BodyFormat) -> Self
    where
        P: IntoIterator,
        P::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        self.payload = Some(Payload::new(pairs, format));
        self
    }

    //
    // Facets
    //

    /// Set the User-Agent for this request.
    ///
    /// If never called, no User-Agent header is emitted.
    pub fn agent<S: Into<String>>(mut self, agent: S) -> Self {
        self.settings.agent = Some(agent.into());
        self.settings.mark_configured(Facet::Agent);
        self
    }

    /// Set the Referer for this request.
    ///
    /// If never called, the transport fills in the Referer automatically
    /// when following redirects.
    pub fn referer<S: Into<String>>(mut self, referer: S) -> Self {
        self.settings.referer = Some(referer.into());
        self.settings.mark_configured(Facet::Referer);
        self
    }

    /// Set whether 3xx responses are followed and how many redirections are
    /// allowed.
    ///
    /// The defaults are to follow, with a maximum of 5.
    pub fn redirect(mut self, follow: bool, max: u32) -> Self {
        self.settings.follow_redirects = follow;
        self.settings.max_redirects = max;
        self.settings.mark_configured(Facet::Redirect);
        self
    }

    /// Set whether the peer's TLS certificate is verified, optionally with a
    /// directory of trusted CA certificates.
    ///
    /// Verification defaults to off. When enabled, the certificate must also
    /// match the full request hostname.
    pub fn ssl(mut self, verify: bool, ca_path: Option<&str>) -> Self {
        self.settings.verify_tls = verify;
        self.settings.ca_path = ca_path.map(str::to_owned);
        self.settings.mark_configured(Facet::Ssl);
        self
    }

    /// Set the cookies sent with this request as a `k=v; k2=v2` header.
    ///
    /// Passing no pairs starts a fresh cookie session instead, which is also
    /// the default.
    pub fn cookie<P, K, V>(mut self, pairs: P) -> Self
    where
        P: IntoIterator,
        P::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        self.settings.cookies = collect_pairs(pairs);
        self.settings.mark_configured(Facet::Cookie);
        self
    }

    //
    // Settings
    //

    /// Toggle verbose transport diagnostics for this request.
    ///
    /// Diagnostics go to the log as trace events and never alter the
    /// returned body.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.settings.verbose = enabled;
        self
    }

    /// Set the maximum time allowed to establish the connection.
    ///
    /// The default is 1 second.
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.settings.connect_timeout = duration;
        self
    }

    /// Set the maximum time allowed for the whole request.
    ///
    /// The default is 30 seconds.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.settings.timeout = duration;
        self
    }

    //
    // Dispatch
    //

    /// Dispatch this request with the GET method and return the response
    /// body.
    pub fn get<U: AsRef<str>>(self, url: U) -> Result<String> {
        self.dispatch(Method::Get, url.as_ref())
    }

    /// Dispatch this request with the POST method and return the response
    /// body.
    pub fn post<U: AsRef<str>>(self, url: U) -> Result<String> {
        self.dispatch(Method::Post, url.as_ref())
    }

    /// Dispatch this request with the PUT method and return the response
    /// body.
    pub fn put<U: AsRef<str>>(self, url: U) -> Result<String> {
        self.dispatch(Method::Put, url.as_ref())
    }

    /// Dispatch this request with the DELETE method and return the response
    /// body.
    pub fn delete<U: AsRef<str>>(self, url: U) -> Result<String> {
        self.dispatch(Method::Delete, url.as_ref())
    }

    /// Dispatch this request using a verb name.
    ///
    /// Any name outside get, post, put and delete fails with
    /// `ErrorKind::UnsupportedMethod` before any request state is built and
    /// without touching the transport.
    pub fn invoke<U: AsRef<str>>(self, verb: &str, url: U) -> Result<String> {
        let method = verb.parse::<Method>()?;
        self.dispatch(method, url.as_ref())
    }

    fn dispatch(self, method: Method, url: &str) -> Result<String> {
        let RequestBuilder {
            mut transport,
            settings,
            payload,
        } = self;
        let request = PendingRequest::new(method, url, payload, settings)?;
        request.dispatch(&mut transport)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::result::Result;

    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::{OptionKey, TransportError, TransportOption};

    /// Records everything the pipeline hands to the transport, so tests can
    /// check the assembled request without a network.
    #[derive(Debug, Default)]
    struct Recorded {
        options: Vec<TransportOption>,
        header_lines: Vec<String>,
        executions: usize,
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingTransport {
        state: Rc<RefCell<Recorded>>,
        response: String,
        fail_with: Option<String>,
    }

    impl RecordingTransport {
        fn new() -> RecordingTransport {
            RecordingTransport::default()
        }

        fn failing(message: &str) -> RecordingTransport {
            RecordingTransport {
                fail_with: Some(message.to_owned()),
                ..RecordingTransport::default()
            }
        }

        fn option(&self, key: OptionKey) -> Option<TransportOption> {
            (*self.state)
                .borrow()
                .options
                .iter()
                .find(|option| option.key() == key)
                .cloned()
        }

        fn keys(&self) -> Vec<OptionKey> {
            (*self.state).borrow().options.iter().map(|o| o.key()).collect()
        }
    }

    impl Transport for RecordingTransport {
        fn set_option(&mut self, option: TransportOption) -> Result<(), TransportError> {
            self.state.borrow_mut().options.push(option);
            Ok(())
        }

        fn set_headers(&mut self, lines: &[String]) -> Result<(), TransportError> {
            self.state.borrow_mut().header_lines = lines.to_vec();
            Ok(())
        }

        fn execute(&mut self) -> Result<String, TransportError> {
            self.state.borrow_mut().executions += 1;
            match &self.fail_with {
                Some(message) => Err(TransportError::new(message.clone())),
                None => Ok(self.response.clone()),
            }
        }
    }

    fn builder(transport: &RecordingTransport) -> RequestBuilder<RecordingTransport> {
        RequestBuilder::with_transport(transport.clone())
    }

    #[test]
    fn test_get_appends_query_to_url() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .query(&[("wd", "hello")], BodyFormat::Form)
            .get("http://example.com/s")
            .unwrap();

        assert_eq!(
            transport.option(OptionKey::Url),
            Some(TransportOption::Url("http://example.com/s?wd=hello".into()))
        );
        assert_eq!(transport.option(OptionKey::Body), None);
        assert_eq!((*transport.state).borrow().executions, 1);
    }

    #[test]
    fn test_get_query_percent_encodes() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .query(&[("wd", "hello world")], BodyFormat::Form)
            .get("http://example.com/s")
            .unwrap();

        assert_eq!(
            transport.option(OptionKey::Url),
            Some(TransportOption::Url("http://example.com/s?wd=hello+world".into()))
        );
    }

    #[test]
    fn test_post_json_body_and_headers() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .query(&[("name", "a")], BodyFormat::Json)
            .post("http://example.com/api")
            .unwrap();

        let body = br#"{"name":"a"}"#.to_vec();
        let length = body.len();
        assert_eq!(transport.option(OptionKey::Body), Some(TransportOption::Body(body)));
        assert_eq!(
            (*transport.state).borrow().header_lines,
            vec![
                "Content-Type: application/json; charset=utf-8".to_owned(),
                format!("Content-Length: {}", length),
            ]
        );
    }

    #[test]
    fn test_post_form_body_without_headers() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .query(&[("a", "1"), ("b", "2")], BodyFormat::Form)
            .post("http://example.com/api")
            .unwrap();

        assert_eq!(
            transport.option(OptionKey::Body),
            Some(TransportOption::Body(b"a=1&b=2".to_vec()))
        );
        assert!((*transport.state).borrow().header_lines.is_empty());
    }

    #[test]
    fn test_put_and_delete_carry_bodies() {
        for (verb, method) in &[("put", Method::Put), ("delete", Method::Delete)] {
            let transport = RecordingTransport::new();
            builder(&transport)
                .query(&[("k", "v")], BodyFormat::Form)
                .invoke(verb, "http://example.com/api")
                .unwrap();

            assert_eq!(
                transport.option(OptionKey::Method),
                Some(TransportOption::Method(*method))
            );
            assert_eq!(
                transport.option(OptionKey::Body),
                Some(TransportOption::Body(b"k=v".to_vec()))
            );
        }
    }

    #[test]
    fn test_default_facets_applied_in_fixed_order() {
        let transport = RecordingTransport::new();
        builder(&transport).get("http://example.com").unwrap();

        assert_eq!(
            transport.keys(),
            vec![
                OptionKey::Method,
                OptionKey::Url,
                OptionKey::AutoReferer,
                OptionKey::FollowRedirects,
                OptionKey::MaxRedirects,
                OptionKey::VerifyPeer,
                OptionKey::VerifyHost,
                OptionKey::SessionCookies,
                OptionKey::ConnectTimeout,
                OptionKey::Timeout,
            ]
        );
        assert_eq!(
            transport.option(OptionKey::FollowRedirects),
            Some(TransportOption::FollowRedirects(true))
        );
        assert_eq!(
            transport.option(OptionKey::MaxRedirects),
            Some(TransportOption::MaxRedirects(5))
        );
        assert_eq!(
            transport.option(OptionKey::VerifyPeer),
            Some(TransportOption::VerifyPeer(false))
        );
        assert_eq!(
            transport.option(OptionKey::VerifyHost),
            Some(TransportOption::VerifyHost(false))
        );
        assert_eq!(
            transport.option(OptionKey::ConnectTimeout),
            Some(TransportOption::ConnectTimeout(Duration::from_secs(1)))
        );
        assert_eq!(
            transport.option(OptionKey::Timeout),
            Some(TransportOption::Timeout(Duration::from_secs(30)))
        );
        // no agent configured, so no User-Agent is emitted
        assert_eq!(transport.option(OptionKey::UserAgent), None);
    }

    #[test]
    fn test_configured_ssl_never_falls_back_to_default() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .ssl(true, Some("/etc/ssl/certs"))
            .get("https://example.com")
            .unwrap();

        let recorded = (*transport.state).borrow();
        let verify_peer: Vec<_> = recorded
            .options
            .iter()
            .filter(|o| o.key() == OptionKey::VerifyPeer)
            .collect();
        assert_eq!(verify_peer, vec![&TransportOption::VerifyPeer(true)]);
        drop(recorded);
        assert_eq!(
            transport.option(OptionKey::VerifyHost),
            Some(TransportOption::VerifyHost(true))
        );
        assert_eq!(
            transport.option(OptionKey::CaPath),
            Some(TransportOption::CaPath("/etc/ssl/certs".into()))
        );
    }

    #[test]
    fn test_ca_path_ignored_when_not_verifying() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .ssl(false, Some("/etc/ssl/certs"))
            .get("https://example.com")
            .unwrap();

        assert_eq!(transport.option(OptionKey::CaPath), None);
        assert_eq!(
            transport.option(OptionKey::VerifyPeer),
            Some(TransportOption::VerifyPeer(false))
        );
    }

    #[test]
    fn test_agent_and_referer_configured() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .agent("confetch-test/1.0")
            .referer("http://example.com/prev")
            .get("http://example.com")
            .unwrap();

        assert_eq!(
            transport.option(OptionKey::UserAgent),
            Some(TransportOption::UserAgent("confetch-test/1.0".into()))
        );
        assert_eq!(
            transport.option(OptionKey::Referer),
            Some(TransportOption::Referer("http://example.com/prev".into()))
        );
        // explicit referer replaces the automatic one
        assert_eq!(transport.option(OptionKey::AutoReferer), None);
    }

    #[test]
    fn test_cookie_pairs_build_header_string() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .cookie(&[("session", "abc"), ("lang", "en")])
            .get("http://example.com")
            .unwrap();

        assert_eq!(
            transport.option(OptionKey::Cookie),
            Some(TransportOption::Cookie("session=abc; lang=en".into()))
        );
        assert_eq!(transport.option(OptionKey::SessionCookies), None);
    }

    #[test]
    fn test_empty_cookie_pairs_enable_session_cookies() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .cookie(Vec::<(&str, &str)>::new())
            .get("http://example.com")
            .unwrap();

        assert_eq!(
            transport.option(OptionKey::SessionCookies),
            Some(TransportOption::SessionCookies(true))
        );
        assert_eq!(transport.option(OptionKey::Cookie), None);
    }

    #[test]
    fn test_debug_enables_verbose_option() {
        let transport = RecordingTransport::new();
        builder(&transport).debug(true).get("http://example.com").unwrap();

        assert_eq!(
            transport.option(OptionKey::Verbose),
            Some(TransportOption::Verbose(true))
        );
    }

    #[test]
    fn test_unsupported_verb_makes_no_transport_calls() {
        let transport = RecordingTransport::new();
        let err = builder(&transport)
            .query(&[("k", "v")], BodyFormat::Form)
            .invoke("patch", "http://example.com")
            .unwrap_err();

        match err.kind() {
            ErrorKind::UnsupportedMethod(verb) => assert_eq!(verb, "patch"),
            other => panic!("unexpected error kind: {:?}", other),
        }
        let recorded = (*transport.state).borrow();
        assert!(recorded.options.is_empty());
        assert_eq!(recorded.executions, 0);
    }

    #[test]
    fn test_transport_failure_surfaces_as_error() {
        let transport = RecordingTransport::failing("could not resolve host");
        let err = builder(&transport).get("http://example.com").unwrap_err();

        match err.kind() {
            ErrorKind::Transport(failure) => assert_eq!(failure.message(), "could not resolve host"),
            other => panic!("unexpected error kind: {:?}", other),
        }
        assert_eq!((*transport.state).borrow().executions, 1);
    }

    #[test]
    fn test_custom_timeouts_override_defaults() {
        let transport = RecordingTransport::new();
        builder(&transport)
            .connect_timeout(Duration::from_millis(250))
            .timeout(Duration::from_secs(5))
            .get("http://example.com")
            .unwrap();

        assert_eq!(
            transport.option(OptionKey::ConnectTimeout),
            Some(TransportOption::ConnectTimeout(Duration::from_millis(250)))
        );
        assert_eq!(
            transport.option(OptionKey::Timeout),
            Some(TransportOption::Timeout(Duration::from_secs(5)))
        );
    }

    #[test]
    fn test_invoke_accepts_known_verbs() {
        for (verb, method) in &[
            ("get", Method::Get),
            ("post", Method::Post),
            ("put", Method::Put),
            ("delete", Method::Delete),
        ] {
            let transport = RecordingTransport::new();
            builder(&transport).invoke(verb, "http://example.com").unwrap();
            assert_eq!(
                transport.option(OptionKey::Method),
                Some(TransportOption::Method(*method))
            );
        }
    }
}

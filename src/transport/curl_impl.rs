use curl::easy::{Easy, InfoType, List};

use crate::request::Method;
use crate::transport::{Transport, TransportError, TransportOption};

/// The production [`Transport`], backed by a libcurl easy handle.
///
/// The handle is created when the transport is created and freed when it is
/// dropped, on every exit path.
#[derive(Debug)]
pub struct CurlTransport {
    handle: Easy,
    verbose: bool,
}

impl CurlTransport {
    pub fn new() -> CurlTransport {
        CurlTransport {
            handle: Easy::new(),
            verbose: false,
        }
    }
}

impl Default for CurlTransport {
    fn default() -> CurlTransport {
        CurlTransport::new()
    }
}

impl From<curl::Error> for TransportError {
    fn from(err: curl::Error) -> TransportError {
        TransportError::new(err.description())
    }
}

impl Transport for CurlTransport {
    fn set_option(&mut self, option: TransportOption) -> Result<(), TransportError> {
        match option {
            TransportOption::Method(method) => match method {
                Method::Get => self.handle.get(true)?,
                Method::Post => self.handle.post(true)?,
                other => self.handle.custom_request(other.as_str())?,
            },
            TransportOption::Url(url) => self.handle.url(&url)?,
            TransportOption::Body(body) => self.handle.post_fields_copy(&body)?,
            TransportOption::UserAgent(agent) => self.handle.useragent(&agent)?,
            TransportOption::Referer(referer) => self.handle.referer(&referer)?,
            TransportOption::AutoReferer(enabled) => self.handle.autoreferer(enabled)?,
            TransportOption::FollowRedirects(follow) => self.handle.follow_location(follow)?,
            TransportOption::MaxRedirects(max) => self.handle.max_redirections(max)?,
            TransportOption::VerifyPeer(verify) => self.handle.ssl_verify_peer(verify)?,
            TransportOption::VerifyHost(verify) => self.handle.ssl_verify_host(verify)?,
            TransportOption::CaPath(path) => self.handle.capath(&path)?,
            TransportOption::Cookie(cookie) => self.handle.cookie(&cookie)?,
            TransportOption::SessionCookies(enabled) => self.handle.cookie_session(enabled)?,
            TransportOption::ConnectTimeout(timeout) => self.handle.connect_timeout(timeout)?,
            TransportOption::Timeout(timeout) => self.handle.timeout(timeout)?,
            TransportOption::Verbose(enabled) => {
                self.verbose = enabled;
                self.handle.verbose(enabled)?;
            }
        }
        Ok(())
    }

    fn set_headers(&mut self, lines: &[String]) -> Result<(), TransportError> {
        let mut list = List::new();
        for line in lines {
            list.append(line)?;
        }
        self.handle.http_headers(list)?;
        Ok(())
    }

    fn execute(&mut self) -> Result<String, TransportError> {
        let verbose = self.verbose;
        let mut body = Vec::new();
        {
            let mut transfer = self.handle.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            if verbose {
                transfer.debug_function(trace_frame)?;
            }
            transfer.perform()?;
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Forward libcurl's verbose frames to the log. Diagnostics are best-effort
/// and must never fail the transfer.
fn trace_frame(kind: InfoType, data: &[u8]) {
    match kind {
        InfoType::Text => trace!("* {}", String::from_utf8_lossy(data).trim_end()),
        InfoType::HeaderOut => trace!("> {}", String::from_utf8_lossy(data).trim_end()),
        InfoType::HeaderIn => trace!("< {}", String::from_utf8_lossy(data).trim_end()),
        InfoType::DataOut => trace!("sent {} bytes of body data", data.len()),
        InfoType::DataIn => trace!("received {} bytes of body data", data.len()),
        _ => (),
    }
}

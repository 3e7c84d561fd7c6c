//! libcurl-backed [`HttpClient`].

use std::str;

use super::{parse::parse_header_lines, FetchError, HttpClient, HttpResponse};
use crate::config::HttpConfig;

/// Blocking GET client using a fresh curl easy handle per request.
///
/// Follows redirects (bounded), sends the configured User-Agent, applies
/// connect and total timeouts, and skips TLS verification unless
/// `verify_tls` is set. Call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone, Default)]
pub struct CurlClient {
    config: HttpConfig,
}

impl CurlClient {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    fn easy_for(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.config.max_redirections)?;
        easy.useragent(&self.config.user_agent)?;
        easy.connect_timeout(self.config.connect_timeout())?;
        easy.timeout(self.config.timeout())?;
        easy.ssl_verify_peer(self.config.verify_tls)?;
        easy.ssl_verify_host(self.config.verify_tls)?;
        easy.accept_encoding("")?;
        Ok(easy)
    }
}

impl HttpClient for CurlClient {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let mut easy = self.easy_for(url)?;
        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts the next hop of a redirect chain.
                    if line.starts_with("HTTP/") {
                        header_lines.clear();
                    }
                    header_lines.push(line.to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let final_url = easy
            .effective_url()?
            .map(str::to_string)
            .unwrap_or_else(|| url.to_string());

        tracing::trace!(url, status, final_url = %final_url, bytes = body.len(), "GET");

        Ok(HttpResponse {
            status,
            final_url,
            headers: parse_header_lines(&header_lines),
            body,
        })
    }
}

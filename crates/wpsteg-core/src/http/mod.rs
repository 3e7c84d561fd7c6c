//! HTTP seam: a blocking GET client trait, its libcurl implementation, and
//! the explicit per-request outcome type used by the fetcher and crawler.

mod curl_client;
mod parse;

pub use curl_client::CurlClient;
pub use parse::parse_header_lines;

use crate::control::AuditCancelled;

/// Error for a single request. Never fatal for an audit on its own: callers
/// turn it into an empty contribution and log it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Timeout, DNS failure, connection refused, TLS failure, ...
    #[error("request failed: {0}")]
    Transport(#[from] curl::Error),
    /// Server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
    /// Body was not the JSON shape we expected.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Cancelled(#[from] AuditCancelled),
}

/// Outcome of one page or listing request.
///
/// `Empty` means the server answered with nothing to collect; `Failed` means
/// the request or its body was unusable.
#[derive(Debug)]
pub enum Fetched<T> {
    Data(T),
    Empty,
    Failed(FetchError),
}

/// Response to a GET after redirects were followed.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u32,
    /// Effective URL after redirects; relative links resolve against this.
    pub final_url: String,
    /// Header lines of the final hop, in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `Err(FetchError::Status)` unless the status is 2xx.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Status(self.status))
        }
    }
}

/// Blocking GET client. Implementations must bound every request with a
/// timeout. Shared across blocking tasks, hence `Send + Sync`.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

impl<C: HttpClient + ?Sized> HttpClient for std::sync::Arc<C> {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        (**self).get(url)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        (**self).get(url)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory client serving canned responses by exact URL.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct FakeClient {
        routes: HashMap<String, HttpResponse>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeClient {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn route(mut self, url: &str, status: u32, body: &str) -> Self {
            self.routes.insert(
                url.to_string(),
                HttpResponse {
                    status,
                    final_url: url.to_string(),
                    headers: Vec::new(),
                    body: body.as_bytes().to_vec(),
                },
            );
            self
        }

        pub(crate) fn route_with_headers(
            mut self,
            url: &str,
            status: u32,
            headers: &[(&str, &str)],
            body: &str,
        ) -> Self {
            self.routes.insert(
                url.to_string(),
                HttpResponse {
                    status,
                    final_url: url.to_string(),
                    headers: headers
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    body: body.as_bytes().to_vec(),
                },
            );
            self
        }

        /// Serve `url` as if the server redirected it to `final_url`.
        pub(crate) fn redirect(mut self, url: &str, final_url: &str, body: &str) -> Self {
            self.routes.insert(
                url.to_string(),
                HttpResponse {
                    status: 200,
                    final_url: final_url.to_string(),
                    headers: Vec::new(),
                    body: body.as_bytes().to_vec(),
                },
            );
            self
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        pub(crate) fn count(&self, url: &str) -> usize {
            self.requests().iter().filter(|u| *u == url).count()
        }
    }

    impl HttpClient for FakeClient {
        fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            Ok(self.routes.get(url).cloned().unwrap_or(HttpResponse {
                status: 404,
                final_url: url.to_string(),
                headers: Vec::new(),
                body: Vec::new(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let resp = HttpResponse {
            status: 200,
            headers: vec![("X-WP-TotalPages".to_string(), "3".to_string())],
            ..Default::default()
        };
        assert_eq!(resp.header("x-wp-totalpages"), Some("3"));
        assert_eq!(resp.header("content-type"), None);
    }

    #[test]
    fn error_for_status_maps_non_2xx() {
        let ok = HttpResponse {
            status: 204,
            ..Default::default()
        };
        assert!(ok.error_for_status().is_ok());
        let err = HttpResponse {
            status: 500,
            ..Default::default()
        }
        .error_for_status()
        .unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));
    }
}

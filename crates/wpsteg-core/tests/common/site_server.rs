//! Minimal HTTP/1.1 server serving canned WordPress-like routes for
//! integration tests.
//!
//! Routes are keyed by request target (path plus query). Unknown targets get
//! 404. Every response closes the connection. Hits per target are counted so
//! tests can assert how often a page was fetched.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Sleep before answering (simulates a hung server).
    pub delay: Option<Duration>,
}

#[derive(Debug, Default, Clone)]
pub struct Routes {
    routes: HashMap<String, Route>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(mut self, target: &str, status: u16, headers: &[(&str, &str)], body: &str) -> Self {
        self.routes.insert(
            target.to_string(),
            Route {
                status,
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.to_string(),
                delay: None,
            },
        );
        self
    }

    pub fn html(self, target: &str, body: &str) -> Self {
        self.raw(target, 200, &[("Content-Type", "text/html")], body)
    }

    /// Auto-index style listing of `links` under `target`.
    pub fn listing(self, target: &str, links: &[&str]) -> Self {
        let rows: String = links
            .iter()
            .map(|l| format!("<tr><td><a href=\"{l}\">{l}</a></td></tr>\n"))
            .collect();
        let body = format!(
            "<html><head><title>Index of {target}</title></head>\
             <body><h1>Index of {target}</h1><table>\n{rows}</table></body></html>"
        );
        self.html(target, &body)
    }

    pub fn json(self, target: &str, total_pages: u32, body: &str) -> Self {
        let total = total_pages.to_string();
        self.raw(
            target,
            200,
            &[("Content-Type", "application/json"), ("X-WP-TotalPages", total.as_str())],
            body,
        )
    }

    pub fn status(self, target: &str, status: u16) -> Self {
        self.raw(target, status, &[], "")
    }

    pub fn redirect(self, target: &str, location: &str) -> Self {
        self.raw(target, 302, &[("Location", location)], "")
    }

    pub fn delayed(mut self, target: &str, delay: Duration) -> Self {
        if let Some(route) = self.routes.get_mut(target) {
            route.delay = Some(delay);
        }
        self
    }
}

pub struct SiteServer {
    /// e.g. "http://127.0.0.1:12345" (no trailing slash).
    pub base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl SiteServer {
    pub fn url(&self, target: &str) -> String {
        format!("{}{}", self.base, target)
    }

    pub fn authority(&self) -> &str {
        self.base.trim_start_matches("http://")
    }

    pub fn hits(&self, target: &str) -> usize {
        self.hits.lock().unwrap().get(target).copied().unwrap_or(0)
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(routes: Routes) -> SiteServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes.routes);
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let hits_server = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits_server);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    SiteServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    // TLS client hellos and other garbage end up here and are dropped.
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return;
    };
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(
            b"HTTP/1.1 405 Method Not Allowed\r\n\
              Content-Length: 0\r\n\
              Connection: close\r\n\r\n",
        );
        return;
    }
    *hits.lock().unwrap().entry(target.to_string()).or_default() += 1;

    let not_found = Route {
        status: 404,
        headers: Vec::new(),
        body: "not found".to_string(),
        delay: None,
    };
    let route = routes.get(target).unwrap_or(&not_found);
    if let Some(delay) = route.delay {
        thread::sleep(delay);
    }
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    for (k, v) in &route.headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(route.body.as_bytes());
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

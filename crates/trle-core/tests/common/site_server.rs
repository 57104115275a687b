//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed table of routes (path plus query) with canned status,
//! headers and body. HEAD gets the same headers without the body.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Content-Length to announce instead of the real body length.
    pub declared_len: Option<usize>,
}

impl Route {
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Route {
            status: 200,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.into(),
            declared_len: None,
        }
    }

    pub fn html(body: &str) -> Self {
        Self::ok("text/html; charset=utf-8", body)
    }

    pub fn redirect(location: &str) -> Self {
        Route {
            status: 302,
            headers: vec![
                ("Location".to_string(), location.to_string()),
                ("Content-Type".to_string(), "text/html".to_string()),
            ],
            body: Vec::new(),
            declared_len: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Route {
            status,
            headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            body: b"error".to_vec(),
            declared_len: None,
        }
    }

    /// Announces `declared_len` bytes but sends only `body`, then closes the
    /// connection mid-transfer.
    pub fn truncated(content_type: &str, body: impl Into<Vec<u8>>, declared_len: usize) -> Self {
        Route {
            declared_len: Some(declared_len),
            ..Self::ok(content_type, body)
        }
    }
}

/// Starts a server in a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Runs until the process exits.
pub fn start(routes: HashMap<String, Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Route>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");

    let not_found = Route::status(404);
    let route = routes.get(target).unwrap_or(&not_found);
    let reason = match route.status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        _ => "Status",
    };
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status,
        reason,
        route.declared_len.unwrap_or(route.body.len())
    );
    for (k, v) in &route.headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(&route.body);
    }
}

//! Common test utilities

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use reqopts::{LoginApi, LoginResponse, RequestBody, RequestContext, RequestError, Transport};
use ureq::http::{Request, Response};

// ==================== Login Stubs ====================

/// Login stub that counts calls and returns a token derived from the identity
#[derive(Default)]
pub struct CountingLogin {
    pub calls: AtomicUsize,
}

impl CountingLogin {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LoginApi for CountingLogin {
    fn login(&self, _ctx: &RequestContext, identity: &str, _secret: &str) -> Result<LoginResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LoginResponse {
            token: format!("token-for-{}", identity),
        })
    }
}

/// Login stub that always rejects the credentials
pub struct FailingLogin;

impl LoginApi for FailingLogin {
    fn login(&self, _ctx: &RequestContext, _identity: &str, _secret: &str) -> Result<LoginResponse> {
        bail!("invalid credentials")
    }
}

// ==================== Recording Transport ====================

/// What the transport saw for one request
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Query pairs decoded from the URI
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::Url::parse(&self.uri)
            .map(|u| u.query_pairs().into_owned().collect())
            .unwrap_or_default()
    }
}

/// Transport stub that records every request and answers with `status`
pub struct RecordingTransport {
    pub status: u16,
    pub requests: Mutex<Vec<Recorded>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::with_status(200)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    type Body = Vec<u8>;

    fn send(
        &self,
        ctx: &RequestContext,
        request: Request<Option<RequestBody>>,
    ) -> Result<Response<Vec<u8>>, RequestError> {
        ctx.check()?;
        let (parts, body) = request.into_parts();
        let recorded = Recorded {
            method: parts.method.to_string(),
            uri: parts.uri.to_string(),
            headers: parts
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect(),
            body: body.map(|b| b.into_bytes().expect("body should be readable")),
        };
        self.requests.lock().unwrap().push(recorded);

        Ok(Response::builder()
            .status(self.status)
            .header("x-stub", "1")
            .body(b"{\"ok\":true}".to_vec())
            .expect("stub response"))
    }
}

// ==================== Local HTTP Stub ====================

/// Serve one canned HTTP response on a random local port.
/// Returns the base URL and a receiver for the raw request text.
pub fn serve_once(status_line: &str, body: &str) -> (String, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let addr = listener.local_addr().expect("local addr");
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let raw = read_request(&mut stream);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
            let _ = tx.send(raw);
        }
    });

    (format!("http://{}", addr), rx)
}

/// Accept one connection and never answer it
pub fn serve_silent(hold: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let addr = listener.local_addr().expect("local addr");

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = read_request(&mut stream);
            thread::sleep(hold);
        }
    });

    format!("http://{}", addr)
}

fn read_request(stream: &mut TcpStream) -> String {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).into_owned(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let chunked = head.contains("transfer-encoding: chunked");
    let complete = |buf: &[u8]| {
        if chunked {
            buf[header_end..].windows(5).any(|w| w == b"0\r\n\r\n")
        } else {
            buf.len() >= header_end + content_length
        }
    };

    while !complete(&buf) {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

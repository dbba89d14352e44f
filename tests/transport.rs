//! ureq transport against a local HTTP stub

mod common;

use std::io::Read;
use std::time::{Duration, Instant};

use common::{CountingLogin, FailingLogin, serve_once, serve_silent};
use reqopts::{
    Executor, HttpMethod, RequestContext, RequestError, RequestOptions, StaticToken, with_body,
    with_method, with_query_params,
};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_request_reaches_server_with_headers_and_query() {
    let (base, raw) = serve_once("200 OK", r#"{"hello":"world"}"#);
    let exec = Executor::new(StaticToken("abc123".to_string()));
    let opts = RequestOptions::new([
        with_method(HttpMethod::Post),
        with_query_params([("name", "xyz"), ("age", "10")]),
    ]);

    let resp = exec
        .execute(
            &RequestContext::with_timeout(Duration::from_secs(10)),
            &format!("{}/items", base),
            "me",
            "pw",
            Some(opts),
        )
        .expect("request should succeed");
    assert_eq!(resp.status(), 200);

    let mut body = String::new();
    resp.into_body()
        .into_reader()
        .read_to_string(&mut body)
        .unwrap();
    assert_eq!(body, r#"{"hello":"world"}"#);

    let raw = raw.recv_timeout(RECV_TIMEOUT).expect("server saw request");
    let lower = raw.to_lowercase();
    let request_line = raw.lines().next().unwrap_or_default();
    assert!(request_line.starts_with("POST /items?"), "line was {}", request_line);
    assert!(request_line.contains("name=xyz"));
    assert!(request_line.contains("age=10"));
    assert!(lower.contains("authorization: bearer abc123"));
    assert!(lower.contains("accept: application/json"));
    assert!(lower.contains("content-type: application/json"));
}

#[test]
fn test_error_status_returned_as_response() {
    let (base, _raw) = serve_once("404 Not Found", r#"{"error":"missing"}"#);
    let exec = Executor::new(CountingLogin::default());

    let resp = exec
        .execute(
            &RequestContext::with_timeout(Duration::from_secs(10)),
            &base,
            "me",
            "pw",
            None,
        )
        .expect("404 is still a response");
    assert_eq!(resp.status(), 404);
    assert_eq!(exec.login_api().calls(), 1);
}

#[test]
fn test_body_is_streamed() {
    let (base, raw) = serve_once("201 Created", "{}");
    let exec = Executor::new(StaticToken("t".to_string()));
    let opts = RequestOptions::default()
        .with_method(HttpMethod::Put)
        .with_body(r#"{"name":"xyz"}"#);

    let resp = exec
        .execute(&RequestContext::background(), &base, "me", "pw", Some(opts))
        .unwrap();
    assert_eq!(resp.status(), 201);

    let raw = raw.recv_timeout(RECV_TIMEOUT).expect("server saw request");
    assert!(raw.starts_with("PUT /"));
    assert!(raw.contains(r#"{"name":"xyz"}"#));
}

#[test]
fn test_post_without_body_sends_zero_length() {
    let (base, raw) = serve_once("200 OK", "{}");
    let exec = Executor::new(StaticToken("t".to_string()));
    let opts = RequestOptions::new([
        with_method(HttpMethod::Post),
        with_body(None),
        with_query_params([("name", "xyz"), ("age", "10")]),
    ]);

    exec.execute(&RequestContext::background(), &base, "me", "pw", Some(opts))
        .unwrap();

    let raw = raw.recv_timeout(RECV_TIMEOUT).expect("server saw request");
    let lower = raw.to_lowercase();
    assert!(raw.starts_with("POST /?age=10&name=xyz "), "request was {}", raw);
    assert!(lower.contains("content-length: 0"), "request was {}", raw);
    assert!(!lower.contains("transfer-encoding"));
    assert!(raw.ends_with("\r\n\r\n"));
}

#[test]
fn test_get_without_body_sends_no_length() {
    let (base, raw) = serve_once("200 OK", "{}");
    let exec = Executor::new(StaticToken("t".to_string()));

    exec.execute(&RequestContext::background(), &base, "me", "pw", None)
        .unwrap();

    let lower = raw
        .recv_timeout(RECV_TIMEOUT)
        .expect("server saw request")
        .to_lowercase();
    assert!(lower.starts_with("get / "));
    assert!(!lower.contains("transfer-encoding"));
}

#[test]
fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let exec = Executor::new(StaticToken("t".to_string()));

    let err = exec
        .execute(
            &RequestContext::with_timeout(Duration::from_secs(10)),
            &format!("http://127.0.0.1:{}/", port),
            "me",
            "pw",
            None,
        )
        .unwrap_err();
    assert!(matches!(err, RequestError::Http(_)), "got {:?}", err);
}

#[test]
fn test_login_failure_never_connects() {
    let (base, raw) = serve_once("200 OK", "{}");
    let exec = Executor::new(FailingLogin);

    let err = exec
        .execute(&RequestContext::background(), &base, "me", "pw", None)
        .unwrap_err();
    assert!(matches!(err, RequestError::Login { .. }));
    assert!(raw.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn test_cancel_in_flight_returns_promptly() {
    let base = serve_silent(Duration::from_secs(10));
    let exec = Executor::new(StaticToken("t".to_string()));
    let ctx = RequestContext::background();
    let handle = ctx.cancel_handle();

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        handle.cancel();
    });

    let started = Instant::now();
    let err = exec.execute(&ctx, &base, "me", "pw", None).unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, RequestError::Cancelled), "got {:?}", err);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn test_deadline_bounds_in_flight_call() {
    let base = serve_silent(Duration::from_secs(10));
    let exec = Executor::new(StaticToken("t".to_string()));
    let ctx = RequestContext::with_timeout(Duration::from_millis(300));

    let started = Instant::now();
    let err = exec.execute(&ctx, &base, "me", "pw", None).unwrap_err();

    assert!(matches!(err, RequestError::DeadlineExceeded), "got {:?}", err);
    assert!(err.is_cancellation());
    assert!(started.elapsed() < Duration::from_secs(3));
}

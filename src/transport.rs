//! Transport seam between the executor and the network
//!
//! [`UreqTransport`] sends through the shared ureq agent. The blocking call
//! runs on a worker thread so a cancelled context can return early instead
//! of waiting for the peer.

use std::io::Read;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use ureq::http::header::{self, HeaderValue};
use ureq::http::{Method, Request, Response};
use ureq::{Agent, AsSendBody, Body, SendBody};

use crate::context::RequestContext;
use crate::error::RequestError;
use crate::http;
use crate::options::RequestBody;

/// How often an in-flight call re-checks its context
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Sends one fully built request
pub trait Transport: Send + Sync {
    /// Response body type handed back to the caller
    type Body;

    fn send(
        &self,
        ctx: &RequestContext,
        request: Request<Option<RequestBody>>,
    ) -> Result<Response<Self::Body>, RequestError>;
}

/// Transport backed by a ureq agent
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(http::agent().clone())
    }
}

impl UreqTransport {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    type Body = Body;

    fn send(
        &self,
        ctx: &RequestContext,
        request: Request<Option<RequestBody>>,
    ) -> Result<Response<Body>, RequestError> {
        let agent = self.agent.clone();
        call_with_context(ctx, move |timeout| run(&agent, request, timeout))
    }
}

/// Run a blocking ureq call on a worker thread and wait for it while `ctx`
/// stays live. The call receives the time left before the deadline.
///
/// A timeout under a deadline is reported as [`RequestError::DeadlineExceeded`].
/// Once the context is cancelled or expired the worker is abandoned.
pub(crate) fn call_with_context<R, F>(ctx: &RequestContext, call: F) -> Result<R, RequestError>
where
    R: Send + 'static,
    F: FnOnce(Option<Duration>) -> Result<R, ureq::Error> + Send + 'static,
{
    ctx.check()?;

    let timeout = ctx.remaining();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = call(timeout);
        // Receiver is gone when the caller already gave up
        let _ = tx.send(result);
    });

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(result) => {
                return result.map_err(|err| match err {
                    ureq::Error::Timeout(_) if timeout.is_some() => {
                        RequestError::DeadlineExceeded
                    }
                    err => RequestError::Http(err),
                });
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Err(err) = ctx.check() {
                    warn!(error = %err, "abandoning in-flight request");
                    return Err(err);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!("request worker exited without a result");
                return Err(RequestError::WorkerStopped);
            }
        }
    }
}

fn run(
    agent: &Agent,
    request: Request<Option<RequestBody>>,
    timeout: Option<Duration>,
) -> Result<Response<Body>, ureq::Error> {
    let (mut parts, body) = request.into_parts();
    debug!(method = %parts.method, uri = %parts.uri, "sending request");

    match body {
        Some(body) => {
            let mut reader: Box<dyn Read + Send> = body.into_reader();
            let request = Request::from_parts(parts, SendBody::from_reader(&mut reader));
            dispatch(agent, request, timeout)
        }
        None if carries_body(&parts.method) => {
            // Sized empty body so the peer sees content-length: 0
            parts
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
            let empty: &[u8] = &[];
            dispatch(agent, Request::from_parts(parts, empty), timeout)
        }
        None => dispatch(agent, Request::from_parts(parts, ()), timeout),
    }
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn dispatch<S: AsSendBody>(
    agent: &Agent,
    request: Request<S>,
    timeout: Option<Duration>,
) -> Result<Response<Body>, ureq::Error> {
    let mut config = agent.configure_request(request);
    if let Some(left) = timeout {
        config = config.timeout_global(Some(left));
    }
    agent.run(config.build())
}

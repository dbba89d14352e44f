//! Authenticated request execution
//!
//! [`Executor::execute`] resolves a bearer token, assembles the request from
//! [`RequestOptions`] and hands it to the transport exactly once. Responses
//! come back untouched whatever their status.

use tracing::{debug, instrument, warn};
use ureq::http::{Request, Response, header};
use url::Url;

use crate::context::RequestContext;
use crate::error::RequestError;
use crate::login::LoginApi;
use crate::options::{RequestBody, RequestOptions};
use crate::transport::{Transport, UreqTransport};

/// Token sent when a caller asks for an invalid one
pub const INVALID_TOKEN: &str = "Invalid Token";

/// Content type attached to every request
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Runs single authenticated requests against a login collaborator and a
/// transport
#[derive(Debug, Clone)]
pub struct Executor<L, T = UreqTransport> {
    login: L,
    transport: T,
}

impl<L: LoginApi> Executor<L, UreqTransport> {
    /// Executor using the shared ureq agent
    pub fn new(login: L) -> Self {
        Self::with_transport(login, UreqTransport::default())
    }
}

impl<L: LoginApi, T: Transport> Executor<L, T> {
    pub fn with_transport(login: L, transport: T) -> Self {
        Self { login, transport }
    }

    pub fn login_api(&self) -> &L {
        &self.login
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Log in (unless an invalid token was requested), build the request and
    /// send it once.
    ///
    /// `None` options behave exactly like `RequestOptions::default()`.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Login`] when the collaborator fails; nothing is sent
    /// - [`RequestError::Cancelled`] / [`RequestError::DeadlineExceeded`] when
    ///   the context ends, including mid-login
    /// - [`RequestError::InvalidUrl`] / [`RequestError::InvalidRequest`] when
    ///   the request cannot be assembled
    /// - whatever the transport reports, unchanged
    #[instrument(skip(self, ctx, secret, options))]
    pub fn execute(
        &self,
        ctx: &RequestContext,
        target_url: &str,
        identity: &str,
        secret: &str,
        options: Option<RequestOptions>,
    ) -> Result<Response<T::Body>, RequestError> {
        let options = options.unwrap_or_default();
        ctx.check()?;

        let token = self.resolve_token(ctx, &options, identity, secret)?;
        let request = build_request(target_url, &token, options)?;

        ctx.check()?;
        debug!(method = %request.method(), uri = %request.uri(), "issuing request");
        self.transport.send(ctx, request)
    }

    fn resolve_token(
        &self,
        ctx: &RequestContext,
        options: &RequestOptions,
        identity: &str,
        secret: &str,
    ) -> Result<String, RequestError> {
        if options.use_invalid_token {
            debug!("using invalid bearer token");
            return Ok(INVALID_TOKEN.to_string());
        }

        match self.login.login(ctx, identity, secret) {
            Ok(resp) => Ok(resp.token),
            Err(err) => {
                // A login cut short by the context reports the context's error
                ctx.check()?;
                match err.downcast_ref::<RequestError>() {
                    Some(RequestError::Cancelled) => return Err(RequestError::Cancelled),
                    Some(RequestError::DeadlineExceeded) => {
                        return Err(RequestError::DeadlineExceeded);
                    }
                    _ => {}
                }
                warn!(error = %err, "login failed");
                Err(RequestError::login(err))
            }
        }
    }
}

/// Assemble the outbound request: URL with query, method, the three fixed
/// headers and the optional body.
pub fn build_request(
    target_url: &str,
    token: &str,
    options: RequestOptions,
) -> Result<Request<Option<RequestBody>>, RequestError> {
    let mut url = Url::parse(target_url)?;

    let query = options.sorted_query();
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    let request = Request::builder()
        .method(ureq::http::Method::from(options.method))
        .uri(url.as_str())
        .header(header::ACCEPT, options.accept_header.as_str())
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
        .body(options.body)?;

    Ok(request)
}

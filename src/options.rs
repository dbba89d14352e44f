//! Optional request parameters
//!
//! [`RequestOptions`] starts from fixed defaults and is then shaped by an
//! ordered list of [`ReqOption`] mutators. Each mutator touches only the
//! fields it names, so when two mutators set the same field the later one
//! wins. Nothing is validated here; odd combinations are legal to build.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor, Read};
use std::str::FromStr;

use anyhow::bail;

/// Default value of the `Accept` header
pub const DEFAULT_ACCEPT: &str = "application/json";

/// HTTP methods supported by the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Uppercase wire name (e.g., "GET")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// All supported methods
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Head,
            HttpMethod::Options,
        ]
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other => bail!("unsupported HTTP method: {}", other),
        }
    }
}

impl From<HttpMethod> for ureq::http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
        }
    }
}

/// Opaque request payload, read once when the request is sent
pub struct RequestBody(Box<dyn Read + Send>);

impl RequestBody {
    /// Wrap any byte source
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self(Box::new(reader))
    }

    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.0
    }

    /// Drain the payload into memory
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut reader = self.0;
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestBody(..)")
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_reader(Cursor::new(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        Self::from(s.into_bytes())
    }
}

impl From<&'static str> for RequestBody {
    fn from(s: &'static str) -> Self {
        Self::from_reader(s.as_bytes())
    }
}

/// Settings consumed by one call to the executor
#[derive(Debug)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<RequestBody>,
    /// Send a deliberately invalid bearer token instead of logging in
    pub use_invalid_token: bool,
    pub query_params: Option<HashMap<String, String>>,
    pub accept_header: String,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            body: None,
            use_invalid_token: false,
            query_params: None,
            accept_header: DEFAULT_ACCEPT.to_string(),
        }
    }
}

impl RequestOptions {
    /// Apply `options` in order on top of the defaults
    pub fn new(options: impl IntoIterator<Item = ReqOption>) -> Self {
        options
            .into_iter()
            .fold(Self::default(), |mut draft, option| {
                option.apply(&mut draft);
                draft
            })
    }

    pub fn with_method(self, method: HttpMethod) -> Self {
        self.with(ReqOption::Method(method))
    }

    pub fn with_body(self, body: impl Into<RequestBody>) -> Self {
        self.with(ReqOption::Body(Some(body.into())))
    }

    pub fn with_use_invalid_token(self, use_invalid_token: bool) -> Self {
        self.with(ReqOption::UseInvalidToken(use_invalid_token))
    }

    pub fn with_query_params<K, V>(self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.with(with_query_params(params))
    }

    pub fn with_accept_header(self, accept_header: impl Into<String>) -> Self {
        self.with(ReqOption::AcceptHeader(accept_header.into()))
    }

    /// Apply a single mutator
    pub fn with(mut self, option: ReqOption) -> Self {
        option.apply(&mut self);
        self
    }

    /// Query pairs sorted by key; empty when none are configured
    pub fn sorted_query(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .query_params
            .iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

/// A single field-setting step applied to a [`RequestOptions`] draft
#[derive(Debug)]
pub enum ReqOption {
    Method(HttpMethod),
    Body(Option<RequestBody>),
    UseInvalidToken(bool),
    QueryParams(Option<HashMap<String, String>>),
    AcceptHeader(String),
    /// Sets the accept header and the method together
    AcceptAndMethod(String, HttpMethod),
}

impl ReqOption {
    /// Write this option's fields into `draft`
    pub fn apply(self, draft: &mut RequestOptions) {
        match self {
            Self::Method(method) => draft.method = method,
            Self::Body(body) => draft.body = body,
            Self::UseInvalidToken(flag) => draft.use_invalid_token = flag,
            Self::QueryParams(params) => draft.query_params = params,
            Self::AcceptHeader(accept) => draft.accept_header = accept,
            Self::AcceptAndMethod(accept, method) => {
                draft.accept_header = accept;
                draft.method = method;
            }
        }
    }
}

pub fn with_method(method: HttpMethod) -> ReqOption {
    ReqOption::Method(method)
}

/// Set (or clear, with `None`) the request body
pub fn with_body(body: Option<RequestBody>) -> ReqOption {
    ReqOption::Body(body)
}

pub fn with_use_invalid_token(use_invalid_token: bool) -> ReqOption {
    ReqOption::UseInvalidToken(use_invalid_token)
}

/// Replace the query parameters with `params`
pub fn with_query_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> ReqOption
where
    K: Into<String>,
    V: Into<String>,
{
    let map = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    ReqOption::QueryParams(Some(map))
}

pub fn with_accept_header(accept_header: impl Into<String>) -> ReqOption {
    ReqOption::AcceptHeader(accept_header.into())
}

/// Two fields in one option. Prefer one field per option; this exists for
/// callers that always change both together.
pub fn with_two_values(accept_header: impl Into<String>, method: HttpMethod) -> ReqOption {
    ReqOption::AcceptAndMethod(accept_header.into(), method)
}

//! Login collaborator
//!
//! The executor only needs a token for a given identity and secret. The
//! [`LoginApi`] trait is that seam; [`HttpLogin`] talks to a JSON login
//! endpoint and [`StaticToken`] hands back a pre-issued token.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::RequestContext;
use crate::http;
use crate::transport::call_with_context;

/// Token returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Trait for anything that can exchange credentials for a bearer token
pub trait LoginApi: Send + Sync {
    fn login(&self, ctx: &RequestContext, identity: &str, secret: &str) -> Result<LoginResponse>;
}

/// Login against an HTTP endpoint accepting `{"email", "password"}` JSON
#[derive(Debug, Clone)]
pub struct HttpLogin {
    login_url: String,
}

#[derive(Serialize)]
struct Credentials {
    email: String,
    password: String,
}

impl HttpLogin {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

impl LoginApi for HttpLogin {
    fn login(&self, ctx: &RequestContext, identity: &str, secret: &str) -> Result<LoginResponse> {
        debug!(url = %self.login_url, "requesting login token");

        let agent = http::agent().clone();
        let url = self.login_url.clone();
        let credentials = Credentials {
            email: identity.to_string(),
            password: secret.to_string(),
        };

        let result = call_with_context(ctx, move |timeout| {
            let mut request = agent.post(&url);
            if let Some(left) = timeout {
                request = request.config().timeout_global(Some(left)).build();
            }
            request.send_json(&credentials)
        });

        let mut response = match result {
            Ok(response) => response,
            Err(err) if err.is_cancellation() => return Err(err.into()),
            Err(err) => {
                return Err(anyhow::Error::new(err).context("Failed to reach login endpoint"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            bail!("login endpoint returned {}", status);
        }

        response
            .body_mut()
            .read_json::<LoginResponse>()
            .context("Failed to parse login response")
    }
}

/// A fixed token, for callers that already hold one
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl LoginApi for StaticToken {
    fn login(&self, ctx: &RequestContext, _identity: &str, _secret: &str) -> Result<LoginResponse> {
        ctx.check()?;
        Ok(LoginResponse {
            token: self.0.clone(),
        })
    }
}

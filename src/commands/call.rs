//! Single request command

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use tracing::debug;

use crate::cli::AuthArgs;
use crate::config::{ReqoptsConfig, timeout_from_secs};
use crate::context::RequestContext;
use crate::executor::Executor;
use crate::login::{HttpLogin, LoginApi, LoginResponse, StaticToken};
use crate::options::{
    HttpMethod, ReqOption, RequestBody, RequestOptions, with_accept_header, with_body,
    with_method, with_query_params, with_use_invalid_token,
};

/// Login collaborator chosen from flags and config
#[derive(Debug, Clone)]
pub enum CliLogin {
    Http(HttpLogin),
    Static(StaticToken),
    /// No login endpoint or token configured
    Missing,
}

impl LoginApi for CliLogin {
    fn login(&self, ctx: &RequestContext, identity: &str, secret: &str) -> Result<LoginResponse> {
        match self {
            Self::Http(login) => login.login(ctx, identity, secret),
            Self::Static(token) => token.login(ctx, identity, secret),
            Self::Missing => {
                bail!("no login endpoint configured; pass --login-url or set login_url in config")
            }
        }
    }
}

/// Resolved credentials and deadline for one invocation
pub struct Session {
    pub executor: Executor<CliLogin>,
    pub identity: String,
    pub secret: String,
    pub ctx: RequestContext,
}

impl Session {
    /// Merge command line flags over the config file
    pub fn from_args(auth: &AuthArgs, config: &ReqoptsConfig) -> Self {
        let login = if let Some(token) = &auth.token {
            CliLogin::Static(StaticToken(token.clone()))
        } else if let Some(url) = auth.login_url.as_ref().or(config.login_url.as_ref()) {
            CliLogin::Http(HttpLogin::new(url.clone()))
        } else {
            CliLogin::Missing
        };

        let timeout = match auth.timeout {
            Some(secs) => timeout_from_secs(secs),
            None => config.timeout(),
        };
        let ctx = match timeout {
            Some(timeout) => RequestContext::with_timeout(timeout),
            None => RequestContext::background(),
        };

        Self {
            executor: Executor::new(login),
            identity: auth
                .identity
                .clone()
                .or_else(|| config.identity.clone())
                .unwrap_or_default(),
            secret: auth
                .secret
                .clone()
                .or_else(ReqoptsConfig::secret_from_env)
                .unwrap_or_default(),
            ctx,
        }
    }
}

/// Flags of the `call` command
pub struct CallArgs {
    pub url: String,
    pub method: HttpMethod,
    pub query: Vec<(String, String)>,
    pub data: Option<String>,
    pub data_file: Option<String>,
    pub accept: Option<String>,
    pub invalid_token: bool,
}

/// Translate flags into options; only flags that were given become options
pub fn options_from_args(args: &CallArgs) -> Result<RequestOptions> {
    let mut opts: Vec<ReqOption> = vec![with_method(args.method)];

    if !args.query.is_empty() {
        opts.push(with_query_params(args.query.iter().cloned()));
    }

    if let Some(data) = &args.data {
        opts.push(with_body(Some(RequestBody::from(data.clone()))));
    } else if let Some(path) = &args.data_file {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open body file {}", path))?;
        opts.push(with_body(Some(RequestBody::from_reader(file))));
    }

    if let Some(accept) = &args.accept {
        opts.push(with_accept_header(accept.clone()));
    }

    if args.invalid_token {
        opts.push(with_use_invalid_token(true));
    }

    Ok(RequestOptions::new(opts))
}

/// Send one request and print status, headers and body
pub fn cmd_call(args: CallArgs, auth: &AuthArgs, config: &ReqoptsConfig) -> Result<()> {
    let options = options_from_args(&args)?;
    let session = Session::from_args(auth, config);
    debug!(url = %args.url, method = %args.method, "call");

    let response = session.executor.execute(
        &session.ctx,
        &args.url,
        &session.identity,
        &session.secret,
        Some(options),
    )?;

    let status = response.status();
    let line = format!("{:?} {}", response.version(), status);
    if status.is_success() {
        eprintln!("{}", line.green());
    } else if status.is_client_error() || status.is_server_error() {
        eprintln!("{}", line.red());
    } else {
        eprintln!("{}", line.yellow());
    }
    for (name, value) in response.headers() {
        eprintln!(
            "{}: {}",
            name.as_str().dimmed(),
            value.to_str().unwrap_or("<binary>")
        );
    }
    eprintln!();

    let mut reader = response.into_body().into_reader();
    let mut stdout = io::stdout().lock();
    io::copy(&mut reader, &mut stdout).context("Failed to read response body")?;
    stdout.flush()?;

    Ok(())
}

//! Sample calls showing default and customized options

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::AuthArgs;
use crate::config::ReqoptsConfig;
use crate::options::{HttpMethod, RequestOptions, with_body, with_method, with_query_params};

use super::call::Session;

/// Options for the second sample call: POST, no body, two query parameters
pub fn demo_post_options() -> RequestOptions {
    RequestOptions::new([
        with_method(HttpMethod::Post),
        with_body(None),
        with_query_params([("name", "xyz"), ("age", "10")]),
    ])
}

/// Issue both sample calls. Outcomes are logged and otherwise ignored, so
/// this always succeeds.
pub fn cmd_demo(url: &str, auth: &AuthArgs, config: &ReqoptsConfig) -> Result<()> {
    let session = Session::from_args(auth, config);

    // defaults only
    let first = session
        .executor
        .execute(&session.ctx, url, &session.identity, &session.secret, None);
    debug!(ok = first.is_ok(), "default call finished");

    let second = session.executor.execute(
        &session.ctx,
        url,
        &session.identity,
        &session.secret,
        Some(demo_post_options()),
    );
    debug!(ok = second.is_ok(), "post call finished");

    info!("demo complete");
    Ok(())
}

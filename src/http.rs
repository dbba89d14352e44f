//! Shared HTTP agent for outbound requests
//!
//! Provides a singleton agent with connection pooling. Every HTTP status is
//! handed back as a response; only transport failures surface as errors.

use std::sync::LazyLock;
use std::time::Duration;

/// Upper bound for any single call when the caller sets no deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Global shared HTTP agent with connection pooling
///
/// Using a static agent allows connection reuse between requests issued
/// from different threads.
pub static HTTP_AGENT: LazyLock<ureq::Agent> = LazyLock::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(DEFAULT_TIMEOUT))
        .http_status_as_error(false)
        .build()
        .new_agent()
});

/// Get a reference to the shared HTTP agent
#[inline]
pub fn agent() -> &'static ureq::Agent {
    &HTTP_AGENT
}

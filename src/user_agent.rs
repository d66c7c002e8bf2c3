//! User-Agent and Referer values for source fetches.
//!
//! CDNs commonly reject non-browser clients, so source requests present a
//! browser User-Agent and a Referer pointing at the source's own origin.

use url::Url;

/// Browser User-Agent sent to source servers.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default User-Agent for source requests.
#[must_use]
pub(crate) fn browser_user_agent() -> &'static str {
    BROWSER_USER_AGENT
}

/// User-Agent for Drime API calls (identifies the tool).
#[must_use]
pub(crate) fn api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("drime-relay/{version}")
}

/// Referer for a source URL: its origin with a trailing slash.
#[must_use]
pub(crate) fn referer_for(url: &Url) -> Option<String> {
    let origin = url.origin();
    origin
        .is_tuple()
        .then(|| format!("{}/", origin.ascii_serialization()))
}

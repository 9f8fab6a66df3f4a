use std::time::Duration;

use reqwest::Client;

const DISABLE_SYSTEM_PROXY_ENV: &str = "CORPCHAT_DISABLE_SYSTEM_PROXY";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client shared by the relay client and the store adapter.
///
/// No overall request timeout is set: a reply stream stays open for the
/// duration of the completion. Idle handling happens per chunk in the chat
/// driver instead.
pub(crate) fn build_http_client() -> Client {
    let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() || cfg!(test) {
        builder = builder.no_proxy();
    }
    builder.build().expect("failed to build reqwest client")
}

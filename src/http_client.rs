use std::time::Duration;

use anyhow::{Context, Result, bail};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("prop_ev/", env!("CARGO_PKG_VERSION"));
const ERROR_SNIPPET_CHARS: usize = 220;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

/// GET `url` with `query` and return the body. Non-2xx responses become
/// errors carrying the status and the start of the body.
pub fn get_text(url: &str, query: &[(&str, &str)]) -> Result<String> {
    let resp = http_client()?
        .get(url)
        .query(query)
        .send()
        .with_context(|| format!("request to {url} failed"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading response body")?;
    if !status.is_success() {
        bail!("http {}: {}", status, snippet(&body));
    }
    Ok(body)
}

fn snippet(body: &str) -> String {
    body.trim()
        .replace(['\n', '\r'], " ")
        .chars()
        .take(ERROR_SNIPPET_CHARS)
        .collect()
}

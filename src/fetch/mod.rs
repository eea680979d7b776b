mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

/// Sends a GET request for `url` through `client`.
pub async fn get<C: HttpClient + ?Sized>(client: &C, url: Url) -> Result<Response> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    Ok(client.execute(req).await?)
}

/// Fetches `url` and decodes its JSON body, failing on non-success statuses.
pub async fn fetch_json<C, T>(client: &C, url: Url) -> Result<T>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let resp = get(client, url.clone()).await?;
    let resp = ensure_success(resp).await?;

    resp.json()
        .await
        .with_context(|| format!("Failed to parse response from {url}"))
}

/// Turns a non-success response into an error carrying status and body.
pub async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    Err(anyhow!("{url} returned status {status}: {body}"))
}

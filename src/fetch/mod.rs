mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;

/// POSTs `body` as JSON to `url` through `client`.
pub async fn post_json<C: HttpClient, T: Serialize>(
    client: &C,
    url: &str,
    body: &T,
) -> Result<reqwest::Response> {
    let mut req = reqwest::Request::new(reqwest::Method::POST, url.parse()?);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());

    Ok(client.execute(req).await?)
}

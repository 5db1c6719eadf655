use gloo_net::http::Request;
use serde_json::Value;
use streaming::{Fetch, FetchError, LocalBoxFuture};

/// Browser `fetch` through gloo-net.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooFetch;

impl Fetch for GlooFetch {
    fn get_json<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Value, FetchError>> {
        Box::pin(async move {
            let resp = Request::get(url)
                .send()
                .await
                .map_err(|e| FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            if !resp.ok() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: resp.status(),
                });
            }
            resp.json::<Value>().await.map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
    }
}

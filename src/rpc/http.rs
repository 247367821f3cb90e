use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use std::time::Duration;

use super::RpcTransport;
use crate::error::{OverlayError, Result};

/// JSON-over-HTTP transport.
///
/// Each call is a `POST {base_url}/methods/{method}` with body
/// `{"args": [...]}`; the response body is the call's JSON result.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("motion-cues/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/methods/{}", self.base_url, method)
    }

    async fn post(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint(method))
            .json(&json!({ "args": args }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OverlayError::Rpc(format!("{} timed out", method))
                } else {
                    OverlayError::Rpc(format!("{}: {}", method, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OverlayError::Rpc(format!(
                "{}: HTTP {}",
                method,
                status.as_u16()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| OverlayError::Decode(format!("{}: {}", method, e)))
    }
}

impl RpcTransport for HttpTransport {
    fn call<'a>(&'a self, method: &'a str, args: Vec<Value>) -> BoxFuture<'a, Result<Value>> {
        self.post(method, args).boxed()
    }
}

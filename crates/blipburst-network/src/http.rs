use std::time::Duration;

use async_trait::async_trait;
use blipburst_injector::NetworkCaller;
use reqwest::Client;
use serde_json::Value;

use crate::identity::CallerIdentity;

/// [`NetworkCaller`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpCaller {
    client: Client,
    identity: CallerIdentity,
}

impl HttpCaller {
    pub fn new(identity: CallerIdentity) -> reqwest::Result<Self> {
        let mut builder = Client::builder().user_agent(identity.user_agent.clone());
        if let Some(timeout_ms) = identity.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build()?;
        Ok(Self { client, identity })
    }

    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }
}

#[async_trait]
impl NetworkCaller for HttpCaller {
    type Error = reqwest::Error;

    /// GET `url`, reject non-success statuses, decode the body as JSON.
    async fn fetch_json(&self, url: &str) -> Result<Value, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!(target: "blipburst_network", url, status = status.as_u16(), "response received");
        response.error_for_status()?.json::<Value>().await
    }
}

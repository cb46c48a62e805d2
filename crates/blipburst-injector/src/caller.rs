use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// The outbound request an injector wraps.
///
/// Implementations fetch `url` and decode the response body. Whatever error
/// they produce is handed back to the injector's consumer untouched, so the
/// error type stays the implementation's own.
#[async_trait]
pub trait NetworkCaller: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch_json(&self, url: &str) -> Result<Value, Self::Error>;
}

#[async_trait]
impl<T: NetworkCaller + ?Sized> NetworkCaller for Arc<T> {
    type Error = T::Error;

    async fn fetch_json(&self, url: &str) -> Result<Value, Self::Error> {
        (**self).fetch_json(url).await
    }
}

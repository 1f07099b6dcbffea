use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::RelayError;

pub mod openrouter;

/// What came back from one completion call.
#[derive(Debug, Clone)]
pub struct Generation {
    pub output: String,
    /// The provider stopped at the token ceiling; a notice has been appended.
    pub truncated: bool,
    /// Start-to-response latency, reported in the request log.
    pub elapsed: Duration,
}

#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, RelayError>;
}

pub type DynProvider = Arc<dyn Provider>;

/// None when no credential is configured; generation endpoints then answer
/// with a configuration error per request while the rest of the server runs.
pub fn make_provider(cfg: &Config) -> Option<DynProvider> {
    cfg.api_key.as_ref().map(|key| {
        Arc::new(openrouter::OpenRouter::new(
            key.clone(),
            cfg.api_base.clone(),
            cfg.referer.clone(),
            cfg.title.clone(),
        )) as DynProvider
    })
}

//! Builds the runtime and config bundle used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};
use runtime::{BattleApi, HttpBattleApi, PushConnector, Runtime, WsConnector};

use crate::config::RuntimeConfig;

/// Builder that assembles the runtime and its backend connections for clients.
///
/// Defaults to the HTTP API and WebSocket push channel at the configured
/// URLs; either can be replaced (tests, alternative transports).
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    api: Option<Arc<dyn BattleApi>>,
    push_connector: Option<Arc<dyn PushConnector>>,
    push_enabled: bool,
}

impl RuntimeBuilder {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            api: None,
            push_connector: None,
            push_enabled: true,
        }
    }

    /// Use a custom backend instead of [`HttpBattleApi`].
    pub fn api(mut self, api: impl BattleApi + 'static) -> Self {
        self.api = Some(Arc::new(api));
        self
    }

    /// Use a custom push connector instead of [`WsConnector`].
    pub fn push_connector(mut self, connector: impl PushConnector) -> Self {
        self.push_connector = Some(Arc::new(connector));
        self
    }

    /// Skip the push channel entirely.
    pub fn without_push(mut self) -> Self {
        self.push_enabled = false;
        self
    }

    /// Build the runtime. Must be called from within a tokio runtime.
    pub fn build(self) -> Result<RuntimeSetup> {
        let api = match self.api {
            Some(api) => api,
            None => Arc::new(
                HttpBattleApi::new(&self.config.server_url, self.config.request_timeout)
                    .context("failed to create HTTP client")?,
            ),
        };

        let mut builder = Runtime::builder()
            .config(self.config.core.clone())
            .shared_api(api);

        if self.push_enabled {
            builder = match self.push_connector {
                Some(connector) => builder.shared_push_connector(connector),
                None => builder.push_connector(WsConnector::new(&self.config.push_url)),
            };
        }

        let runtime = builder.build().context("failed to build runtime")?;

        tracing::info!(
            server = %self.config.server_url,
            push = %self.config.push_url,
            push_enabled = self.push_enabled,
            "runtime ready"
        );

        Ok(RuntimeSetup {
            config: self.config,
            runtime,
        })
    }
}

pub struct RuntimeSetup {
    pub config: RuntimeConfig,
    pub runtime: Runtime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::transport::mock::MockBattleApi;

    #[tokio::test]
    async fn builds_with_injected_backend() {
        let setup = RuntimeBuilder::new(RuntimeConfig::default())
            .api(MockBattleApi::default())
            .without_push()
            .build()
            .unwrap();

        let handle = setup.runtime.handle();
        assert!(handle.session().await.unwrap().is_none());
        setup.runtime.shutdown().await.unwrap();
    }
}

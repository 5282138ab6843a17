//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive battles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::playback::PacingConfig;
use crate::transport::push::{PushInbound, run_push_channel};
use crate::transport::{BattleApi, PushConfig, PushConnector};
use crate::workers::{Command, SessionWorker, WorkerConfig};

const INBOUND_BUFFER: usize = 64;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub pacing: PacingConfig,
    pub push: PushConfig,
    /// Stats refresh period once the push channel gave up
    pub polling_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 256,
            command_buffer_size: 32,
            pacing: PacingConfig::default(),
            push: PushConfig::default(),
            polling_interval: Duration::from_secs(10),
        }
    }
}

/// Main runtime that orchestrates the battle session
///
/// Runtime owns the workers; [`RuntimeHandle`] provides a cloneable façade
/// for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    inbound_tx: mpsc::Sender<PushInbound>,

    // Background workers
    session_worker_handle: JoinHandle<()>,
    push_worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Sender feeding the session worker's push input.
    ///
    /// The built-in push task uses the same channel; alternative transports
    /// and tests can inject messages through it.
    pub fn inbound(&self) -> mpsc::Sender<PushInbound> {
        self.inbound_tx.clone()
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        if let Some(push) = self.push_worker_handle {
            push.abort();
        }

        // Already stopped if every handle clone was dropped.
        let _ = self.handle.shutdown().await;
        drop(self.handle);

        self.session_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    api: Option<Arc<dyn BattleApi>>,
    push_connector: Option<Arc<dyn PushConnector>>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            api: None,
            push_connector: None,
        }
    }

    /// Override the runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Backend used for battle requests and read-only queries (required)
    pub fn api(mut self, api: impl BattleApi + 'static) -> Self {
        self.api = Some(Arc::new(api));
        self
    }

    pub fn shared_api(mut self, api: Arc<dyn BattleApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Connector for the push channel. Without one, push input only comes
    /// through [`Runtime::inbound`].
    pub fn push_connector(mut self, connector: impl PushConnector) -> Self {
        self.push_connector = Some(Arc::new(connector));
        self
    }

    pub fn shared_push_connector(mut self, connector: Arc<dyn PushConnector>) -> Self {
        self.push_connector = Some(connector);
        self
    }

    /// Build the runtime and spawn its workers
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let api = self.api.ok_or(RuntimeError::MissingApi)?;
        let config = self.config;

        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);
        let (subscribe_tx, subscribe_rx) = mpsc::unbounded_channel();

        let push_worker_handle = self.push_connector.map(|connector| {
            tokio::spawn(run_push_channel(
                connector,
                config.push,
                inbound_tx.clone(),
                subscribe_rx,
            ))
        });

        let session_worker = SessionWorker::new(
            Arc::clone(&api),
            event_bus.clone(),
            WorkerConfig {
                pacing: config.pacing,
                polling_interval: config.polling_interval,
            },
            command_rx,
            inbound_rx,
            subscribe_tx,
        );
        let session_worker_handle = tokio::spawn(async move {
            session_worker.run().await;
        });

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus, api),
            inbound_tx,
            session_worker_handle,
            push_worker_handle,
        })
    }
}

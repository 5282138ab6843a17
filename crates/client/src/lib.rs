//! Top-level client orchestrating the Runtime and Frontend layers.
//!
//! # Architecture
//!
//! ```text
//! Client (Top-level container)
//!   ├─→ Runtime (Session worker, playback pacing, push channel)
//!   └─→ Frontend (UI layer - CLI, GUI, etc.)
//! ```
//!
//! The frontend only ever sees a [`RuntimeHandle`](runtime::RuntimeHandle);
//! the client owns the runtime and shuts it down once the frontend returns.

mod builder;

pub use builder::ClientBuilder;

// Re-export Frontend trait from client-frontend-core
pub use client_frontend_core::Frontend;

use anyhow::Result;

/// Top-level client container.
///
/// # Lifecycle
///
/// 1. Client::builder() collects the layers
/// 2. Client::run() hands a RuntimeHandle to the frontend (blocking)
/// 3. On frontend exit, the runtime workers are shut down
pub struct Client {
    runtime: runtime::Runtime,
    frontend: Box<dyn Frontend>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Run the frontend until it returns, then stop the runtime.
    ///
    /// The frontend's error wins over a shutdown error.
    pub async fn run(self) -> Result<()> {
        let Client {
            runtime,
            mut frontend,
        } = self;

        let frontend_result = frontend.run(runtime.handle()).await;

        if let Err(err) = runtime.shutdown().await {
            tracing::warn!("Runtime shutdown failed: {}", err);
        }

        frontend_result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use runtime::{RuntimeHandle, transport::mock::MockBattleApi};

    use super::*;

    struct RecordingFrontend {
        ran: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Frontend for RecordingFrontend {
        async fn run(&mut self, handle: RuntimeHandle) -> Result<()> {
            assert!(handle.session().await?.is_none());
            self.ran.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn runs_frontend_then_shuts_down() {
        let runtime = runtime::Runtime::builder()
            .api(MockBattleApi::default())
            .build()
            .unwrap();
        let ran = Arc::new(AtomicBool::new(false));

        let client = Client::builder()
            .runtime(runtime)
            .frontend(RecordingFrontend {
                ran: Arc::clone(&ran),
            })
            .build()
            .unwrap();

        client.run().await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn build_requires_both_layers() {
        let err = Client::builder().build().err().unwrap();
        assert!(err.to_string().contains("Runtime is required"));
    }
}

//! Push channel: one long-lived connection carrying round results.
//!
//! [`run_push_channel`] owns the connection. It forwards decoded
//! [`ServerPush`] messages and connection health to the session worker,
//! sends outbound [`ClientPush`] messages, and reconnects with a growing
//! delay. After `max_reconnect_attempts` consecutive failed attempts it
//! reports [`ConnectionEvent::PollingEnabled`] and stops.
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use battle_protocol::{ClientPush, ServerPush};

use super::{TransportError, TransportResult};
use crate::events::ConnectionEvent;

/// What the push task hands to the session worker.
#[derive(Debug, Clone)]
pub enum PushInbound {
    Message(ServerPush),
    Connection(ConnectionEvent),
}

/// Opens push connections.
#[async_trait]
pub trait PushConnector: Send + Sync + 'static {
    async fn connect(&self) -> TransportResult<Box<dyn PushConnection>>;
}

/// One open push connection exchanging JSON text frames.
#[async_trait]
pub trait PushConnection: Send {
    async fn send_text(&mut self, text: String) -> TransportResult<()>;

    /// Next text frame; `None` once the peer closed the connection.
    async fn next_text(&mut self) -> Option<TransportResult<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushConfig {
    pub max_reconnect_attempts: u32,
    pub reconnect_delay: Duration,
    pub reconnect_delay_max: Duration,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_millis(1000),
            reconnect_delay_max: Duration::from_millis(5000),
        }
    }
}

/// WebSocket connector backed by `tokio-tungstenite`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PushConnector for WsConnector {
    async fn connect(&self) -> TransportResult<Box<dyn PushConnection>> {
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|err| TransportError::Push(err.to_string()))?;
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl PushConnection for WsConnection {
    async fn send_text(&mut self, text: String) -> TransportResult<()> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|err| TransportError::Push(err.to_string()))
    }

    async fn next_text(&mut self) -> Option<TransportResult<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Binary(bytes)) => {
                    return Some(
                        String::from_utf8(bytes.to_vec())
                            .map_err(|err| TransportError::Push(err.to_string())),
                    );
                }
                Ok(Message::Close(_)) => return None,
                // Ping/pong are answered by tungstenite itself.
                Ok(_) => continue,
                Err(err) => return Some(Err(TransportError::Push(err.to_string()))),
            }
        }
    }
}

/// Drives the push connection until the worker goes away or reconnection
/// gives up.
pub async fn run_push_channel(
    connector: std::sync::Arc<dyn PushConnector>,
    config: PushConfig,
    inbound_tx: mpsc::Sender<PushInbound>,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientPush>,
) {
    let mut failures = 0u32;
    let mut delay = config.reconnect_delay;
    // Replayed after every reconnect so round results keep flowing.
    let mut subscription: Option<ClientPush> = None;

    loop {
        match connector.connect().await {
            Ok(mut connection) => {
                failures = 0;
                delay = config.reconnect_delay;
                info!(target: "runtime::push", "push channel connected");
                if !forward(&inbound_tx, PushInbound::Connection(ConnectionEvent::Connected)).await {
                    return;
                }

                if let Some(message) = &subscription
                    && let Err(err) = send(connection.as_mut(), message).await
                {
                    warn!(target: "runtime::push", %err, "re-subscribe failed");
                }

                let reason = loop {
                    tokio::select! {
                        outbound = outbound_rx.recv() => {
                            let Some(message) = outbound else {
                                debug!(target: "runtime::push", "session worker gone, closing push channel");
                                return;
                            };
                            subscription = Some(message.clone());
                            if let Err(err) = send(connection.as_mut(), &message).await {
                                break err.to_string();
                            }
                        }
                        incoming = connection.next_text() => match incoming {
                            Some(Ok(text)) => {
                                let Some(message) = decode(&text) else { continue };
                                if !forward(&inbound_tx, PushInbound::Message(message)).await {
                                    return;
                                }
                            }
                            Some(Err(err)) => break err.to_string(),
                            None => break "closed by server".to_string(),
                        },
                    }
                };

                warn!(target: "runtime::push", %reason, "push channel disconnected");
                let event = ConnectionEvent::Disconnected { reason };
                if !forward(&inbound_tx, PushInbound::Connection(event)).await {
                    return;
                }
            }
            Err(err) => {
                failures += 1;
                warn!(
                    target: "runtime::push",
                    attempt = failures,
                    max = config.max_reconnect_attempts,
                    %err,
                    "push connection attempt failed"
                );
                let event = ConnectionEvent::ConnectionFailed {
                    attempt: failures,
                    error: err.to_string(),
                };
                if !forward(&inbound_tx, PushInbound::Connection(event)).await {
                    return;
                }

                if failures >= config.max_reconnect_attempts {
                    info!(target: "runtime::push", "giving up on push channel, switching to polling");
                    forward(&inbound_tx, PushInbound::Connection(ConnectionEvent::PollingEnabled))
                        .await;
                    return;
                }
            }
        }

        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(config.reconnect_delay_max);
    }
}

async fn send(connection: &mut dyn PushConnection, message: &ClientPush) -> TransportResult<()> {
    let text = serde_json::to_string(message)?;
    debug!(target: "runtime::push", %text, "push send");
    connection.send_text(text).await
}

fn decode(text: &str) -> Option<ServerPush> {
    match serde_json::from_str::<ServerPush>(text) {
        Ok(message) => Some(message),
        Err(err) => {
            warn!(target: "runtime::push", %err, "undecodable push message dropped");
            None
        }
    }
}

async fn forward(inbound_tx: &mpsc::Sender<PushInbound>, inbound: PushInbound) -> bool {
    inbound_tx.send(inbound).await.is_ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use battle_protocol::{GameId, RoundPayload, RoundResult};

    use super::*;
    use crate::transport::mock::MockPushConnector;

    fn config() -> PushConfig {
        PushConfig {
            max_reconnect_attempts: 3,
            reconnect_delay: Duration::from_millis(100),
            reconnect_delay_max: Duration::from_millis(250),
        }
    }

    async fn next_connection_event(rx: &mut mpsc::Receiver<PushInbound>) -> ConnectionEvent {
        loop {
            match rx.recv().await {
                Some(PushInbound::Connection(event)) => return event,
                Some(PushInbound::Message(_)) => continue,
                None => panic!("push task ended"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_consecutive_failures() {
        let connector = MockPushConnector::new();
        connector.refuse_next(10);
        let (inbound_tx, mut inbound_rx) = mpsc::channel(16);
        let (_outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_push_channel(
            Arc::new(connector.clone()),
            config(),
            inbound_tx,
            outbound_rx,
        ));

        for attempt in 1..=3 {
            assert!(matches!(
                next_connection_event(&mut inbound_rx).await,
                ConnectionEvent::ConnectionFailed { attempt: a, .. } if a == attempt
            ));
        }
        assert_eq!(
            next_connection_event(&mut inbound_rx).await,
            ConnectionEvent::PollingEnabled
        );
        task.await.unwrap();
        assert_eq!(connector.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_messages_and_resubscribes_after_reconnect() {
        let connector = MockPushConnector::new();
        let (inbound_tx, mut inbound_rx) = mpsc::channel(16);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_push_channel(
            Arc::new(connector.clone()),
            config(),
            inbound_tx,
            outbound_rx,
        ));

        assert_eq!(next_connection_event(&mut inbound_rx).await, ConnectionEvent::Connected);
        outbound_tx
            .send(ClientPush::Subscribe { game_id: GameId(4) })
            .unwrap();

        let round = RoundResult::new(2, 10, 10);
        connector.push(&ServerPush::RoundResolved(RoundPayload::Resolved(round.clone())));
        match inbound_rx.recv().await {
            Some(PushInbound::Message(ServerPush::RoundResolved(RoundPayload::Resolved(got)))) => {
                assert_eq!(got, round)
            }
            other => panic!("unexpected inbound: {other:?}"),
        }

        connector.drop_connection();
        assert!(matches!(
            next_connection_event(&mut inbound_rx).await,
            ConnectionEvent::Disconnected { .. }
        ));
        assert_eq!(next_connection_event(&mut inbound_rx).await, ConnectionEvent::Connected);

        tokio::task::yield_now().await;
        assert_eq!(
            connector.sent(),
            vec![
                ClientPush::Subscribe { game_id: GameId(4) },
                ClientPush::Subscribe { game_id: GameId(4) },
            ]
        );
    }
}

use crate::config::ServerConfig;
use crate::core::models::{FileEventMessage, FsEvent};
use crate::infrastructure::registry::{ClientRegistry, Subscription};
use crate::utils::security::RootPath;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{Message, MessageStream, Session};
use async_trait::async_trait;
use futures_util::StreamExt;

/// What the client sent us, reduced to what the session cares about.
#[derive(Debug)]
pub enum Inbound {
    Ping(web::Bytes),
    Close,
    Ignored,
}

#[derive(Debug, thiserror::Error)]
#[error("connection closed")]
pub struct TransportClosed;

/// Message-oriented duplex connection to one live client.
#[async_trait(?Send)]
pub trait SessionTransport: Sized {
    async fn send_text(&mut self, text: String) -> Result<(), TransportClosed>;

    async fn pong(&mut self, payload: &[u8]) -> Result<(), TransportClosed>;

    /// Must resolve to [`Inbound::Close`] once the peer is gone.
    async fn next_inbound(&mut self) -> Inbound;

    async fn shutdown(self);
}

pub struct WsTransport {
    session: Session,
    stream: MessageStream,
}

impl WsTransport {
    pub fn new(session: Session, stream: MessageStream) -> Self {
        Self { session, stream }
    }
}

#[async_trait(?Send)]
impl SessionTransport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportClosed> {
        self.session.text(text).await.map_err(|_| TransportClosed)
    }

    async fn pong(&mut self, payload: &[u8]) -> Result<(), TransportClosed> {
        self.session.pong(payload).await.map_err(|_| TransportClosed)
    }

    async fn next_inbound(&mut self) -> Inbound {
        match self.stream.next().await {
            Some(Ok(Message::Ping(payload))) => Inbound::Ping(payload),
            Some(Ok(Message::Close(reason))) => {
                tracing::debug!("Client closed the connection: {:?}", reason);
                Inbound::Close
            }
            Some(Ok(_)) => Inbound::Ignored,
            Some(Err(e)) => {
                tracing::debug!("Websocket protocol error: {}", e);
                Inbound::Close
            }
            None => Inbound::Close,
        }
    }

    async fn shutdown(self) {
        let _ = self.session.close(None).await;
    }
}

/// JSON text frame for `event`, or `None` when its path is not below the root
/// (e.g. the event raced with a deletion of the root itself).
pub fn encode_event(root: &RootPath, event: &FsEvent) -> Option<String> {
    let Some(path) = root.to_relative(&event.path) else {
        tracing::trace!("Skipping event outside the root: {:?}", event.path);
        return None;
    };
    serde_json::to_string(&FileEventMessage {
        event_type: event.kind,
        path,
    })
    .ok()
}

/// Runs one live client until it disconnects, a write fails, or the registry
/// drops it. The subscription is always released before returning.
pub async fn run_session<T: SessionTransport>(
    mut transport: T,
    mut subscription: Subscription,
    root: &RootPath,
) {
    let client = subscription.id();

    loop {
        tokio::select! {
            biased;

            inbound = transport.next_inbound() => match inbound {
                Inbound::Close => break,
                Inbound::Ping(payload) => {
                    if transport.pong(&payload).await.is_err() {
                        break;
                    }
                }
                Inbound::Ignored => {}
            },

            event = subscription.recv() => {
                let Some(event) = event else {
                    break;
                };
                let Some(text) = encode_event(root, &event) else {
                    continue;
                };
                if let Err(e) = transport.send_text(text).await {
                    tracing::debug!(%client, "Write failed: {}", e);
                    break;
                }
            }
        }
    }

    subscription.close().await;
    transport.shutdown().await;
}

pub async fn ws_route(
    req: HttpRequest,
    body: web::Payload,
    registry: web::Data<ClientRegistry>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, Error> {
    let (response, session, stream) = actix_ws::handle(&req, body)?;

    let peer = req
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let registry = registry.into_inner();

    actix_web::rt::spawn(async move {
        let subscription = registry.register().await;
        let client = subscription.id();
        tracing::info!(%client, "Live client connected from {}", peer);

        run_session(WsTransport::new(session, stream), subscription, &config.root).await;

        tracing::info!(%client, "Live client disconnected");
    });

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::FsEventKind;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    struct FakeTransport {
        outgoing: mpsc::UnboundedSender<String>,
        inbound: mpsc::UnboundedReceiver<Inbound>,
        fail_writes: bool,
        shut_down: Arc<AtomicBool>,
    }

    struct Peer {
        received: mpsc::UnboundedReceiver<String>,
        control: mpsc::UnboundedSender<Inbound>,
        shut_down: Arc<AtomicBool>,
    }

    fn fake(fail_writes: bool) -> (FakeTransport, Peer) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let shut_down = Arc::new(AtomicBool::new(false));
        (
            FakeTransport {
                outgoing: out_tx,
                inbound: in_rx,
                fail_writes,
                shut_down: Arc::clone(&shut_down),
            },
            Peer {
                received: out_rx,
                control: in_tx,
                shut_down,
            },
        )
    }

    #[async_trait(?Send)]
    impl SessionTransport for FakeTransport {
        async fn send_text(&mut self, text: String) -> Result<(), TransportClosed> {
            if self.fail_writes {
                return Err(TransportClosed);
            }
            self.outgoing.send(text).map_err(|_| TransportClosed)
        }

        async fn pong(&mut self, payload: &[u8]) -> Result<(), TransportClosed> {
            self.outgoing
                .send(format!("pong:{}", String::from_utf8_lossy(payload)))
                .map_err(|_| TransportClosed)
        }

        async fn next_inbound(&mut self) -> Inbound {
            self.inbound.recv().await.unwrap_or(Inbound::Close)
        }

        async fn shutdown(self) {
            self.shut_down.store(true, Ordering::SeqCst);
        }
    }

    fn created(path: &str) -> FsEvent {
        FsEvent::new(FsEventKind::Created, path)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn delivers_relative_json_and_deregisters_on_close() {
        let root = RootPath::new("/share");
        let registry = Arc::new(ClientRegistry::default());
        let subscription = registry.register().await;
        let (transport, mut peer) = fake(false);

        let driver = async {
            registry.broadcast(&created("/share/docs/readme.txt")).await;
            let msg = peer.received.recv().await.unwrap();
            peer.control.send(Inbound::Close).unwrap();
            msg
        };

        let ((), msg) = timeout(
            Duration::from_secs(2),
            futures_util::future::join(run_session(transport, subscription, &root), driver),
        )
        .await
        .expect("session finished");

        assert_eq!(msg, r#"{"event_type":"create","path":"docs/readme.txt"}"#);
        assert!(registry.is_empty().await);
        assert!(peer.shut_down.load(Ordering::SeqCst));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn events_outside_the_root_are_skipped() {
        let root = RootPath::new("/share");
        let registry = Arc::new(ClientRegistry::default());
        let subscription = registry.register().await;
        let (transport, mut peer) = fake(false);

        let driver = async {
            registry.broadcast(&created("/elsewhere/secret")).await;
            registry.broadcast(&created("/share/ok.txt")).await;
            let msg = peer.received.recv().await.unwrap();
            peer.control.send(Inbound::Close).unwrap();
            msg
        };

        let ((), msg) = timeout(
            Duration::from_secs(2),
            futures_util::future::join(run_session(transport, subscription, &root), driver),
        )
        .await
        .unwrap();

        assert_eq!(msg, r#"{"event_type":"create","path":"ok.txt"}"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn write_failure_ends_the_session() {
        let root = RootPath::new("/share");
        let registry = Arc::new(ClientRegistry::default());
        let subscription = registry.register().await;
        let (transport, _peer) = fake(true);

        timeout(
            Duration::from_secs(2),
            futures_util::future::join(
                run_session(transport, subscription, &root),
                registry.broadcast(&created("/share/a")),
            ),
        )
        .await
        .expect("session ends after the failed write");

        assert!(registry.is_empty().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn close_wins_over_pending_events() {
        let root = RootPath::new("/share");
        let registry = Arc::new(ClientRegistry::default());
        let subscription = registry.register().await;
        let (transport, mut peer) = fake(false);

        registry.broadcast(&created("/share/late.txt")).await;
        peer.control.send(Inbound::Close).unwrap();

        timeout(
            Duration::from_secs(2),
            run_session(transport, subscription, &root),
        )
        .await
        .unwrap();

        assert!(peer.received.try_recv().is_err());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn pings_are_answered() {
        let root = RootPath::new(std::env::temp_dir());
        let registry = Arc::new(ClientRegistry::default());
        let subscription = registry.register().await;
        let (transport, mut peer) = fake(false);

        peer.control
            .send(Inbound::Ping(web::Bytes::from_static(b"hb")))
            .unwrap();
        peer.control.send(Inbound::Ignored).unwrap();
        peer.control.send(Inbound::Close).unwrap();

        timeout(
            Duration::from_secs(2),
            run_session(transport, subscription, &root),
        )
        .await
        .unwrap();

        assert_eq!(peer.received.recv().await.unwrap(), "pong:hb");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn every_session_gets_one_message_per_event() {
        let root = Arc::new(RootPath::new("/share"));
        let registry = Arc::new(ClientRegistry::default());
        let local = tokio::task::LocalSet::new();

        local
            .run_until(async {
                let mut peers = Vec::new();
                let mut sessions = Vec::new();
                for _ in 0..3 {
                    let subscription = registry.register().await;
                    let (transport, peer) = fake(false);
                    let root = Arc::clone(&root);
                    sessions.push(tokio::task::spawn_local(async move {
                        run_session(transport, subscription, &root).await
                    }));
                    peers.push(peer);
                }

                assert_eq!(registry.broadcast(&created("/share/docs/readme.txt")).await, 3);

                for peer in peers.iter_mut() {
                    let msg = timeout(Duration::from_secs(2), peer.received.recv())
                        .await
                        .unwrap()
                        .unwrap();
                    assert_eq!(msg, r#"{"event_type":"create","path":"docs/readme.txt"}"#);
                    peer.control.send(Inbound::Close).unwrap();
                }
                for session in sessions {
                    session.await.unwrap();
                }
            })
            .await;

        assert!(registry.is_empty().await);
    }
}

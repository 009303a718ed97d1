//! Shared set of live subscriber channels.
//!
//! Every mutation and every broadcast enumeration happens under one lock, so
//! the broadcast loop never sees a half-registered or half-removed client.

use crate::core::models::FsEvent;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;

/// How the broadcast loop hands an event to each subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DeliveryMode {
    /// Wait until every subscriber has room. A stalled subscriber delays all
    /// the others and every later event.
    #[default]
    Blocking,
    /// Never wait: a subscriber whose queue is full misses the event.
    DropIfFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(usize);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

struct ClientChannel {
    id: ClientId,
    sender: mpsc::Sender<FsEvent>,
}

pub struct ClientRegistry {
    clients: Mutex<Vec<ClientChannel>>,
    next_id: AtomicUsize,
    delivery: DeliveryMode,
    capacity: usize,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(DeliveryMode::Blocking, 1)
    }
}

impl ClientRegistry {
    /// `buffer` only applies to [`DeliveryMode::DropIfFull`]; blocking
    /// delivery always uses a single slot per subscriber.
    pub fn new(delivery: DeliveryMode, buffer: usize) -> Self {
        let capacity = match delivery {
            DeliveryMode::Blocking => 1,
            DeliveryMode::DropIfFull => buffer.max(1),
        };
        Self {
            clients: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            delivery,
            capacity,
        }
    }

    pub fn delivery(&self) -> DeliveryMode {
        self.delivery
    }

    pub async fn register(self: &Arc<Self>) -> Subscription {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.capacity);

        self.clients.lock().await.push(ClientChannel { id, sender });
        tracing::debug!(client = %id, "Subscriber registered");

        Subscription {
            id,
            receiver: Some(receiver),
            registry: Arc::clone(self),
            released: false,
        }
    }

    /// Removes the client. Unknown ids are ignored.
    pub async fn unregister(&self, id: ClientId) {
        let mut clients = self.clients.lock().await;
        if let Some(pos) = clients.iter().position(|c| c.id == id) {
            clients.remove(pos);
            tracing::debug!(client = %id, "Subscriber unregistered");
        }
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }

    /// Sends a copy of `event` to every registered client while holding the
    /// lock. Returns how many clients accepted it.
    pub(crate) async fn broadcast(&self, event: &FsEvent) -> usize {
        let clients = self.clients.lock().await;
        let mut delivered = 0;

        for client in clients.iter() {
            match self.delivery {
                DeliveryMode::Blocking => match client.sender.send(event.clone()).await {
                    Ok(()) => delivered += 1,
                    Err(_) => {
                        tracing::debug!(client = %client.id, "Subscriber went away before delivery")
                    }
                },
                DeliveryMode::DropIfFull => match client.sender.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::debug!(client = %client.id, "Subscriber queue full, event dropped")
                    }
                    Err(TrySendError::Closed(_)) => {
                        tracing::debug!(client = %client.id, "Subscriber went away before delivery")
                    }
                },
            }
        }

        delivered
    }
}

/// Receiving side of a registered client.
///
/// [`Subscription::close`] releases the registration. If the subscription is
/// dropped without being closed (task cancelled, panic), the drop closes the
/// channel and schedules the unregister on the current runtime.
pub struct Subscription {
    id: ClientId,
    receiver: Option<mpsc::Receiver<FsEvent>>,
    registry: Arc<ClientRegistry>,
    released: bool,
}

impl Subscription {
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Next event, or `None` once the client has been removed from the registry.
    pub async fn recv(&mut self) -> Option<FsEvent> {
        match self.receiver.as_mut() {
            Some(receiver) => receiver.recv().await,
            None => None,
        }
    }

    /// Drops the receiver first so a broadcast currently waiting on this
    /// client fails immediately, then unregisters.
    pub async fn close(mut self) {
        self.receiver.take();
        self.registry.unregister(self.id).await;
        self.released = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Some(mut receiver) = self.receiver.take() {
            receiver.close();
        }

        let registry = Arc::clone(&self.registry);
        let id = self.id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { registry.unregister(id).await });
            }
            Err(_) => match registry.clients.try_lock() {
                Ok(mut clients) => clients.retain(|c| c.id != id),
                Err(_) => {
                    tracing::debug!(
                        client = %id,
                        "Registry busy and no runtime, closed subscriber left registered"
                    )
                }
            },
        }
    }
}

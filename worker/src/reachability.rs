//! Network reachability as a single level-triggered signal.
//!
//! The platform's network layer is driven through a `NetworkLink` and reports back through a
//! stream of `LinkEvent`s, which a dispatcher task folds into the signal serially.

use std::{net::IpAddr, sync::Arc};

use log::{debug, info, warn};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

/// Notifications emitted by the network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    JoinStarted,
    JoinLost,
    AddressAcquired(IpAddr),
}

/// The network join primitive.
pub trait NetworkLink: Send + Sync + 'static {
    /// Brings the interface up, it should eventually emit `LinkEvent::JoinStarted`.
    fn start(&self);

    /// Requests a join attempt.
    fn join(&self);

    /// Brings the interface down, no events are emitted afterwards.
    fn stop(&self);
}

/// Level-triggered reachability signal.
///
/// Once set it stays set until a disconnection clears it.
#[derive(Debug)]
pub struct Reachability {
    signal: watch::Sender<bool>,
}

impl Reachability {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self { signal }
    }

    /// Maps a network event onto the signal.
    ///
    /// # Arguments
    /// * `event` - The notification to handle.
    /// * `link` - The link to request join attempts from.
    pub fn handle_event<L: NetworkLink + ?Sized>(&self, event: LinkEvent, link: &L) {
        match event {
            LinkEvent::JoinStarted => {
                debug!("network join started");
                link.join();
            }
            LinkEvent::JoinLost => {
                warn!("network join lost, retrying");
                self.signal.send_replace(false);
                link.join();
            }
            LinkEvent::AddressAcquired(ip) => {
                info!("address acquired: {ip}");
                self.signal.send_replace(true);
            }
        }
    }

    pub fn is_reachable(&self) -> bool {
        *self.signal.borrow()
    }

    /// Waits until the signal is set, returns right away if it already is.
    pub async fn await_reachable(&self) {
        let mut rx = self.signal.subscribe();

        // The sender lives as long as `self`, so this never fails.
        let _ = rx.wait_for(|reachable| *reachable).await;
    }
}

impl Default for Reachability {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns a started network link and the task dispatching its events.
pub struct Connectivity<L: NetworkLink> {
    reachability: Arc<Reachability>,
    link: Arc<L>,
    dispatcher: JoinHandle<()>,
}

impl<L: NetworkLink> Connectivity<L> {
    /// Starts `link` and begins dispatching its events.
    ///
    /// # Arguments
    /// * `link` - The network join primitive.
    /// * `events` - The stream of notifications emitted by `link`.
    pub fn start(link: L, mut events: mpsc::UnboundedReceiver<LinkEvent>) -> Self {
        let reachability = Arc::new(Reachability::new());
        let link = Arc::new(link);

        let dispatcher = tokio::spawn({
            let reachability = Arc::clone(&reachability);
            let link = Arc::clone(&link);

            async move {
                while let Some(event) = events.recv().await {
                    reachability.handle_event(event, link.as_ref());
                }
                debug!("network event stream closed");
            }
        });

        link.start();

        Self {
            reachability,
            link,
            dispatcher,
        }
    }

    /// Blocks until the network has acquired an address at least once.
    pub async fn await_reachable(&self) {
        self.reachability.await_reachable().await;
    }

    pub fn is_reachable(&self) -> bool {
        self.reachability.is_reachable()
    }

    /// Stops the link and the event dispatcher.
    pub fn shutdown(self) {
        self.link.stop();
        self.dispatcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::Ipv4Addr,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::*;

    const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 4, 2));

    #[derive(Default)]
    struct CountingLink {
        joins: AtomicUsize,
    }

    impl NetworkLink for CountingLink {
        fn start(&self) {}

        fn join(&self) {
            self.joins.fetch_add(1, Ordering::SeqCst);
        }

        fn stop(&self) {}
    }

    /// Emits its events scripted through `tx` and records every call.
    struct ScriptedLink {
        tx: mpsc::UnboundedSender<LinkEvent>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl NetworkLink for ScriptedLink {
        fn start(&self) {
            self.calls.lock().unwrap().push("start");
            let _ = self.tx.send(LinkEvent::JoinStarted);
        }

        fn join(&self) {
            self.calls.lock().unwrap().push("join");
        }

        fn stop(&self) {
            self.calls.lock().unwrap().push("stop");
        }
    }

    #[test]
    fn join_events_request_a_join() {
        let reachability = Reachability::new();
        let link = CountingLink::default();

        reachability.handle_event(LinkEvent::JoinStarted, &link);
        assert_eq!(link.joins.load(Ordering::SeqCst), 1);
        assert!(!reachability.is_reachable());

        reachability.handle_event(LinkEvent::AddressAcquired(ADDR), &link);
        assert!(reachability.is_reachable());

        reachability.handle_event(LinkEvent::JoinLost, &link);
        assert_eq!(link.joins.load(Ordering::SeqCst), 2);
        assert!(!reachability.is_reachable());
    }

    #[tokio::test]
    async fn signal_stays_set_once_acquired() {
        let reachability = Reachability::new();
        let link = CountingLink::default();

        reachability.handle_event(LinkEvent::AddressAcquired(ADDR), &link);
        reachability.handle_event(LinkEvent::AddressAcquired(ADDR), &link);

        reachability.await_reachable().await;
        reachability.await_reachable().await;
        assert_eq!(link.joins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_blocks_until_an_address_is_acquired() {
        let (tx, rx) = mpsc::unbounded_channel();
        let link = ScriptedLink {
            tx: tx.clone(),
            calls: Mutex::default(),
        };
        let connectivity = Connectivity::start(link, rx);

        let pending = tokio::time::timeout(Duration::from_secs(5), connectivity.await_reachable());
        assert!(pending.await.is_err());
        assert!(!connectivity.is_reachable());

        tx.send(LinkEvent::JoinLost).unwrap();
        tx.send(LinkEvent::AddressAcquired(ADDR)).unwrap();
        connectivity.await_reachable().await;
        assert!(connectivity.is_reachable());

        let link = Arc::clone(&connectivity.link);
        connectivity.shutdown();
        assert_eq!(*link.calls.lock().unwrap(), ["start", "join", "join", "stop"]);
    }
}

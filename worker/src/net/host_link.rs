use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use local_ip_address::local_ip;
use log::{debug, warn};
use tokio::{sync::mpsc, time};

use crate::reachability::{LinkEvent, NetworkLink};

/// `NetworkLink` over the host's own network stack.
///
/// A join succeeds once the host has a routable local address, a failed join is reported as
/// lost after `retry` so it gets requested again.
pub struct HostLink {
    events: mpsc::UnboundedSender<LinkEvent>,
    retry: Duration,
    stopped: Arc<AtomicBool>,
}

impl HostLink {
    /// Creates a new `HostLink`.
    ///
    /// # Arguments
    /// * `retry` - The wait before a failed join is reported.
    ///
    /// # Returns
    /// The link and the stream of events it emits.
    pub fn new(retry: Duration) -> (Self, mpsc::UnboundedReceiver<LinkEvent>) {
        let (events, rx) = mpsc::unbounded_channel();

        let link = Self {
            events,
            retry,
            stopped: Arc::new(AtomicBool::new(false)),
        };

        (link, rx)
    }
}

fn emit(events: &mpsc::UnboundedSender<LinkEvent>, stopped: &AtomicBool, event: LinkEvent) {
    if stopped.load(Ordering::Acquire) {
        return;
    }

    if events.send(event).is_err() {
        debug!("dropping {event:?}, nobody is listening");
    }
}

impl NetworkLink for HostLink {
    fn start(&self) {
        self.stopped.store(false, Ordering::Release);
        emit(&self.events, &self.stopped, LinkEvent::JoinStarted);
    }

    fn join(&self) {
        let events = self.events.clone();
        let stopped = Arc::clone(&self.stopped);
        let retry = self.retry;

        tokio::spawn(async move {
            match local_ip() {
                Ok(ip) => emit(&events, &stopped, LinkEvent::AddressAcquired(ip)),
                Err(e) => {
                    warn!("no local address yet: {e}");
                    time::sleep(retry).await;
                    emit(&events, &stopped, LinkEvent::JoinLost);
                }
            }
        });
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}

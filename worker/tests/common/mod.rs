#![allow(dead_code)]

use std::{
    io,
    net::{IpAddr, Ipv4Addr},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use comms::{BatchRequest, SAMPLE_SIZE, proto};
use machine_learning::{Learner, TrainStats};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
};
use worker::{
    LinkEvent, NetworkLink,
    net::{DialErr, Dialer},
};

/// Offset between the labels of the training and the test corpus.
pub const TEST_OFFSET: usize = 100_000;

/// The label the fake server attaches to the sample at `index`.
pub fn label_of(index: usize) -> u8 {
    (index % 251) as u8
}

/// Answers requests with synthetic samples until the peer closes.
///
/// With `limit` set, the connection is dropped right after reading request `limit + 1`,
/// leaving it unanswered.
///
/// # Returns
/// Every request read, in order.
pub async fn fake_server<S>(mut stream: S, limit: Option<usize>) -> io::Result<Vec<BatchRequest>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut requests = Vec::new();

    while let Some(req) = proto::read_request(&mut stream).await? {
        requests.push(req);
        if limit.is_some_and(|limit| requests.len() > limit) {
            break;
        }

        let bs = req.effective_batch_size().map_err(io::Error::from)?;
        let base = req.index as usize + if req.is_single() { TEST_OFFSET } else { 0 };

        let labels: Vec<u8> = (base..base + bs).map(label_of).collect();
        let samples: Vec<u8> = labels.iter().flat_map(|&l| [l; SAMPLE_SIZE]).collect();
        proto::write_response(&mut stream, &samples, &labels).await?;
    }

    Ok(requests)
}

/// Records what it was fed, scores a sample as correct when its label is a multiple of 3.
#[derive(Default)]
pub struct RecordingLearner {
    pub trained: Vec<Vec<u8>>,
    pub evaluated: Vec<u8>,
    pub accuracies: Vec<f32>,
}

impl Learner for RecordingLearner {
    fn train(&mut self, samples: &[u8], labels: &[u8]) -> machine_learning::Result<TrainStats> {
        assert_eq!(samples.len(), labels.len() * SAMPLE_SIZE);
        assert!(samples.chunks(SAMPLE_SIZE).zip(labels).all(|(s, l)| s.iter().all(|px| px == l)));

        self.trained.push(labels.to_vec());
        Ok(TrainStats::new(1.0 / self.trained.len() as f32, 0.5))
    }

    fn evaluate(&mut self, samples: &[u8], labels: &[u8]) -> machine_learning::Result<f32> {
        assert_eq!(labels.len(), 1);
        assert_eq!(samples.len(), SAMPLE_SIZE);

        let accuracy = if labels[0] % 3 == 0 { 1.0 } else { 0.0 };
        self.evaluated.push(labels[0]);
        self.accuracies.push(accuracy);
        Ok(accuracy)
    }
}

/// Loses the first join, acquires an address on the second.
pub struct FlakyLink {
    events: mpsc::UnboundedSender<LinkEvent>,
    pub joins: AtomicUsize,
    pub stopped: Mutex<bool>,
}

impl FlakyLink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LinkEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let link = Self {
            events,
            joins: AtomicUsize::new(0),
            stopped: Mutex::new(false),
        };

        (link, rx)
    }
}

impl NetworkLink for FlakyLink {
    fn start(&self) {
        let _ = self.events.send(LinkEvent::JoinStarted);
    }

    fn join(&self) {
        let event = match self.joins.fetch_add(1, Ordering::SeqCst) {
            0 => LinkEvent::JoinLost,
            _ => LinkEvent::AddressAcquired(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        };
        let _ = self.events.send(event);
    }

    fn stop(&self) {
        *self.stopped.lock().unwrap() = true;
    }
}

/// Refuses the first `failures` attempts, then hands out `stream`.
pub struct FlakyDialer<S> {
    failures: usize,
    pub attempts: usize,
    stream: Option<S>,
}

impl<S> FlakyDialer<S> {
    pub fn new(failures: usize, stream: S) -> Self {
        Self {
            failures,
            attempts: 0,
            stream: Some(stream),
        }
    }
}

impl<S> Dialer for FlakyDialer<S> {
    type Stream = S;

    async fn dial(&mut self, _addr: &str) -> Result<S, DialErr> {
        self.attempts += 1;

        if self.attempts <= self.failures {
            return Err(DialErr::Connect(io::ErrorKind::ConnectionRefused.into()));
        }

        self.stream
            .take()
            .ok_or_else(|| DialErr::Connect(io::Error::other("already connected")))
    }
}

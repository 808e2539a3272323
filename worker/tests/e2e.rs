use std::{
    net::{IpAddr, Ipv4Addr},
    num::NonZeroUsize,
    time::Duration,
};

use comms::SAMPLE_SIZE;
use dataserver::{Corpus, Mnist, serve};
use machine_learning::{MnistLearner, params};
use rand::{SeedableRng, rngs::StdRng};
use tokio::{net::TcpListener, sync::mpsc};
use worker::{Connectivity, LinkEvent, NetworkLink, Phase, Worker, WorkerConfig, bootstrap, net::TcpDialer};

/// A link that is up as soon as it starts.
struct LoopbackLink(mpsc::UnboundedSender<LinkEvent>);

impl NetworkLink for LoopbackLink {
    fn start(&self) {
        let _ = self.0.send(LinkEvent::JoinStarted);
    }

    fn join(&self) {
        let _ = self.0.send(LinkEvent::AddressAcquired(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }

    fn stop(&self) {}
}

fn corpus(len: usize, seed: u8) -> Corpus {
    let samples = (0..len * SAMPLE_SIZE)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect();
    let labels = (0..len).map(|i| (i % 10) as u8).collect();
    Corpus::new(samples, labels).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn trains_and_evaluates_against_a_real_server() {
    let mnist = Mnist {
        train: corpus(60, 1),
        test: corpus(40, 2),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move { serve(listener, &mnist, Duration::from_secs(10)).await });

    let cfg = WorkerConfig {
        host: "127.0.0.1".to_string(),
        port,
        batch_size: NonZeroUsize::new(5).unwrap(),
        train_steps: 30,
        eval_steps: 40,
        corpus_size: 60,
        seed: Some(3),
        learning_rate: 1e-6,
        ..Default::default()
    };

    let mut rng = StdRng::seed_from_u64(3);
    let blob = params::random(&mut rng).unwrap();
    let learner = MnistLearner::sgd(&blob, cfg.learning_rate).unwrap();
    let mut worker = Worker::new(&cfg, learner, rng).unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    let connectivity = Connectivity::start(LoopbackLink(tx), rx);

    let metrics = bootstrap::run(&cfg, &connectivity, &mut TcpDialer, &mut worker)
        .await
        .unwrap();
    connectivity.shutdown();

    assert_eq!(worker.phase(), Phase::Done);
    assert_eq!(metrics.train_steps, 30);
    assert_eq!(metrics.eval_steps, 40);
    assert_eq!(metrics.eval_accuracy.count(), 40);
    assert!((0.0..=1.0).contains(&metrics.eval_accuracy.mean()));
    assert!(metrics.last_loss.is_some_and(f32::is_finite));

    assert_ne!(worker.learner().params(), params::from_blob(&blob).unwrap().as_slice());

    server.abort();
}

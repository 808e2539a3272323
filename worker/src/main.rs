use std::{fs, process};

use anyhow::Context;
use log::{error, info};
use machine_learning::{MnistLearner, params};
use rand::{SeedableRng, rngs::StdRng};
use tokio::signal;

use worker::{
    Connectivity, Worker, WorkerConfig, bootstrap,
    net::{HostLink, TcpDialer},
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        error!("{e:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = WorkerConfig::from_env()?;

    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let blob = match &cfg.params_path {
        Some(path) => fs::read(path)
            .with_context(|| format!("failed to read parameters from {}", path.display()))?,
        None => {
            info!("no parameters given, starting from a random initialization");
            params::random(&mut rng)?
        }
    };

    let learner = MnistLearner::sgd(&blob, cfg.learning_rate)?;
    let mut worker = Worker::new(&cfg, learner, rng)?;

    let (link, events) = HostLink::new(cfg.retry_interval);
    let connectivity = Connectivity::start(link, events);
    let mut dialer = TcpDialer;

    let res = tokio::select! {
        ret = bootstrap::run(&cfg, &connectivity, &mut dialer, &mut worker) => ret.map(Some),
        _ = signal::ctrl_c() => Ok(None),
    };

    if matches!(res, Ok(None)) {
        info!("received SIGINT while {}", worker.phase());
    }

    connectivity.shutdown();

    if let Some(metrics) = res? {
        info!(
            "done: {} training steps, {} evaluation steps, average accuracy {}",
            metrics.train_steps,
            metrics.eval_steps,
            metrics.eval_accuracy.mean()
        );
    }

    Ok(())
}

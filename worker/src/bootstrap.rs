use log::info;
use machine_learning::Learner;
use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    BatchClient, Connectivity, NetworkLink, Phase, Result, Worker, WorkerConfig, WorkerMetrics,
    net::{Dialer, connect},
};

/// Runs a worker from the ground up: waits for the network, connects to the data server and
/// drives both phases over the single connection.
///
/// # Arguments
/// * `cfg` - The run configuration.
/// * `connectivity` - The started network link.
/// * `dialer` - Opens the data server connection.
/// * `worker` - A worker still in `Phase::Connecting`.
///
/// # Returns
/// The run's metrics or the first fatal failure.
pub async fn run<N, D, L, G>(
    cfg: &WorkerConfig,
    connectivity: &Connectivity<N>,
    dialer: &mut D,
    worker: &mut Worker<L, G>,
) -> Result<WorkerMetrics>
where
    N: NetworkLink,
    D: Dialer,
    D::Stream: AsyncRead + AsyncWrite,
    L: Learner,
    G: Rng,
{
    worker.enter(Phase::Connecting);

    info!("waiting for the network");
    connectivity.await_reachable().await;

    let addr = cfg.server_addr();
    let stream = connect(dialer, &addr, cfg.retry_interval).await?;

    let (rx, tx) = tokio::io::split(stream);
    let mut client = BatchClient::new(rx, tx, cfg.recv_timeout);

    let metrics = worker.run(&mut client).await?;
    info!("run finished, closing the connection to {addr}");

    Ok(metrics)
}

use dataserver::{Mnist, ServerConfig, serve};
use log::info;
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cfg = ServerConfig::from_env()?;
    let mnist = Mnist::load_dir(&cfg.mnist_dir)?;

    let addr = cfg.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    tokio::select! {
        ret = serve(listener, &mnist, cfg.idle_timeout) => ret?,
        _ = signal::ctrl_c() => info!("received SIGINT"),
    }

    Ok(())
}

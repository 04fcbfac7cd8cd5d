mod cli;
mod collector;
mod config;

use std::net::SocketAddr;

use clap::Parser as _;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use poem::http::StatusCode;
use poem::listener::TcpListener;
use poem::web::Data;
use poem::{get, handler, EndpointExt, Response, Route, Server};
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::task::spawn_blocking;
use tracing::{info, Level};

use cli::Args;
use collector::JobsCollector;
use config::Settings;

#[handler]
async fn metrics(Data(registry): Data<&Registry>) -> poem::Result<Response> {
    // gather() runs squeue synchronously, keep that off the reactor
    let registry = registry.clone();
    let families = spawn_blocking(move || registry.gather())
        .await
        .map_err(|e| poem::Error::from_string(format!("joining scrape task: {e}"), StatusCode::INTERNAL_SERVER_ERROR))?;

    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    encoder
        .encode(&families, &mut body)
        .map_err(|e| poem::Error::from_string(format!("encoding metrics: {e}"), StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Response::builder().content_type(encoder.format_type()).body(body))
}

#[handler]
fn index() -> &'static str {
    "slurm job exporter; metrics live under /metrics\n"
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    register_logging(args.log_level)?;

    let Settings {
        listen_ip,
        listen_port,
    } = Settings::new().context("loading config")?;
    let listen = SocketAddr::new(args.ip.unwrap_or(listen_ip), args.port.unwrap_or(listen_port));

    let registry = Registry::new();
    registry
        .register(Box::new(JobsCollector::new()?))
        .map_err(|e| eyre!("registering jobs collector: {e}"))?;

    info!(%listen, "serving metrics");
    let app = Route::new()
        .at("/", get(index))
        .at("/metrics", get(metrics))
        .data(registry);
    Server::new(TcpListener::bind(listen))
        .run(app)
        .await
        .context("running exposition server")?;

    Ok(())
}

fn register_logging(level: Option<Level>) -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level.unwrap_or(Level::INFO))
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber")
}

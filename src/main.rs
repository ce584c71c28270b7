// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use ipc_pipe_transport::{
    Endpoint, Message, Mode, TransportError,
    cfg::{
        cli::resolve_config_path,
        config::{Config, EndpointRole},
        logger::init_logger,
    },
    socket::StaticSocketView,
};
use tokio::time::timeout;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let logger_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "configs/demo-logger.yaml".to_string());
    let _guard = init_logger(&logger_path).ok();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "configs/demo-dial.yaml".to_string());
    let cfg = resolve_config_path(&config_path)
        .and_then(Config::load_from_file)
        .context("failed to resolve or load config")?;

    let socket = StaticSocketView::new(cfg.endpoint.proto, cfg.endpoint.rcvmax);

    match cfg.endpoint.role {
        EndpointRole::Listen => run_listener(&cfg, &socket).await,
        EndpointRole::Dial => run_dialer(&cfg, &socket).await,
    }
}

async fn run_listener(cfg: &Config, socket: &StaticSocketView) -> Result<()> {
    let endpoint = Endpoint::init(&cfg.endpoint.url, socket, Mode::Listen)
        .context("failed to initialize listen endpoint")?;
    endpoint.bind().context("bind failed")?;
    info!(addr = %cfg.endpoint.url, "listening for ipc connections");

    let pipe = timeout(cfg.runtime.connect_timeout, endpoint.accept())
        .await
        .context("accept timed out")?
        .context("accept failed")?;
    info!(peer = pipe.peer(), "accepted ipc connection");

    loop {
        match pipe.recv().await {
            Ok(msg) => {
                info!(len = msg.body().len(), "received message");
            },
            Err(e) if e.is_cancelled() => break,
            Err(TransportError::Io(io)) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                info!("peer closed the pipe");
                break;
            },
            Err(e) => return Err(e.into()),
        }
    }

    pipe.fini().await;
    endpoint.fini().await;
    Ok(())
}

async fn run_dialer(cfg: &Config, socket: &StaticSocketView) -> Result<()> {
    let endpoint = Endpoint::init(&cfg.endpoint.url, socket, Mode::Dial)
        .context("failed to initialize dial endpoint")?;

    let pipe = timeout(cfg.runtime.connect_timeout, endpoint.connect())
        .await
        .context("connect timed out")?
        .context("connect failed")?;
    info!(peer = pipe.peer(), "connected to ipc listener");

    for n in 0..cfg.runtime.message_count {
        let msg = Message::from_body(cfg.runtime.message.clone().into_bytes());
        let sent = pipe.send(msg).await.context("send failed")?;
        info!(iteration = n, sent, "sent message");
    }

    pipe.fini().await;
    endpoint.fini().await;
    Ok(())
}

use anyhow::anyhow;
use axum::serve;
use futures::TryFutureExt;
use log::{error, info, LevelFilter};
use site::{
    app, build_app_state, collect_static, get_config_info, get_log_level, setup_logger, Cli,
    Command,
};
use std::{net::SocketAddr, path::Path, str::FromStr};
use tokio::{net::TcpListener, runtime, signal};

fn main() -> anyhow::Result<()> {
    let cli = get_config_info();
    let log_level = get_log_level(&cli);

    setup_logger()
        .level(log_level)
        .level_for("site", log_level)
        .level_for("http_response", log_level)
        .level_for("http_request", log_level)
        .level_for("sqlx", LevelFilter::Warn)
        .apply()?;

    let runtime = runtime::Builder::new_multi_thread()
        .worker_threads(cli.workers())
        .enable_all()
        .build()?;

    match cli.command() {
        Command::Serve => runtime.block_on(run_server(cli)),
        Command::CollectStatic { clear } => runtime.block_on(async {
            let source = cli.static_dir();
            let root = cli.static_root();
            info!("collecting {} into {}", source, root);
            collect_static(Path::new(&source), Path::new(&root), clear).await?;
            Ok::<(), anyhow::Error>(())
        }),
    }
}

async fn run_server(cli: Cli) -> anyhow::Result<()> {
    let port = cli.port()?;
    let host = cli.host();
    let remote_url = cli.remote_url(port);

    let socket_addr = SocketAddr::from_str(&format!("{}:{}", host, port))
        .map_err(|e| anyhow!("invalid address: {}", e))?;

    let listener = TcpListener::bind(socket_addr)
        .map_err(|e| anyhow!("error binding to socket: {}", e))
        .await?;

    info!("soilcast starting ({:?} mode)...", cli.mode());
    info!("  Listen:  http://{}", socket_addr);
    info!("  Docs:    http://{}/docs", socket_addr);
    info!("  Data:    {}", cli.data_dir());
    info!("  Static:  {}", cli.served_static_dir());
    info!("  Workers: {}", cli.workers());

    let app_state = build_app_state(&cli, remote_url).await.map_err(|e| {
        error!("error building app: {}", e);
        e
    })?;
    let db = app_state.db.clone();

    let app = app(app_state);

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    db.checkpoint().await;
    info!("soilcast stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

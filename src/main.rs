use std::{
    net::{Ipv6Addr, SocketAddr},
    process,
    sync::Arc,
};

use log::{error, info, warn};
use vouchers_api::{app, config::Config, db::Db};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
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

    info!("shutdown signal received, closing server");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_thread_ids(true).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let db = match Db::open(&config.database_path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("failed to open database {}: {}", config.database_path, e);
            process::exit(1);
        }
    };

    match db.ping() {
        Ok(()) => info!("connected to database {}", config.database_path),
        Err(e) => error!("database connection error: {}", e),
    }

    let app = app(db, config.api_mode);
    let addr = SocketAddr::from((Ipv6Addr::UNSPECIFIED, config.port));
    info!("started in {} mode on {}", config.api_mode, addr);

    let builder = match axum::Server::try_bind(&addr) {
        Ok(builder) => builder,
        Err(e) => {
            error!("failed to bind {}: {}", addr, e);
            process::exit(1);
        }
    };

    let server = builder
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        error!("server error: {}", e);
        process::exit(1);
    }

    info!("server stopped");
}

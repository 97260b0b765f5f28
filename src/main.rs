use env_logger::Env;
use log::{error, info};
use plate_check::db::SqliteStore;
use plate_check::{server, Config, PlateCheck, Stores};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting plate-check");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };
    let store = match SqliteStore::open(&config.db_path, config.cycle_timeout) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Unable to open db: {}", e);
            process::exit(1);
        }
    };
    let service = Arc::new(PlateCheck::new(Stores::shared(store), config.cycle_timeout));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server_task = tokio::spawn(server::run(config.listen_addr, service, async move {
        shutdown_rx.await.ok();
    }));
    let result = tokio::select! {
        result = &mut server_task => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Unable to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
            shutdown_tx.send(()).ok();
            server_task.await
        }
    };
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("Server failed: {}", e);
            process::exit(1);
        }
        Err(e) => {
            error!("Server task failed: {}", e);
            process::exit(1);
        }
    }
    info!("Exiting main");
}

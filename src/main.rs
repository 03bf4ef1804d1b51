use std::{net::SocketAddr, sync::Arc};

use tokio::{signal, sync::mpsc};
use tracing::{error, info};

use restock_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    let db_arc = Arc::new(db_pool);

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    let notification_sender: Arc<dyn api::services::notifications::NotificationSender> =
        Arc::new(api::services::notifications::TracingSender::default());
    let alert_service = Arc::new(api::services::alerts::AlertService::new(
        db_arc.clone(),
        event_sender.clone(),
        notification_sender,
        cfg.alert_policy.clone(),
    ));
    let ledger_service = api::services::ledger::StockLedgerService::new(
        db_arc.clone(),
        event_sender.clone(),
        alert_service.clone(),
        cfg.stock_policy.clone(),
    );

    let host = cfg.host.clone();
    let port = cfg.port;
    let state = api::AppState {
        db_pool: db_arc,
        config: Arc::new(cfg),
        event_sender,
        ledger_service,
        alert_service,
    };

    let app = api::app(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("restock-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

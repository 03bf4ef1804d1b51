use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

use restock_api::config::AlertPolicyConfig;
use restock_api::db::{establish_connection, run_migrations};
use restock_api::events::EventSender;
use restock_api::services::alerts::AlertService;
use restock_api::services::ledger::{ProvisionRecordCommand, StockLedgerService};
use restock_api::services::notifications::{DeliveryOutcome, NotificationSender, SendError};
use restock_api::stock_health::StockPolicy;

/// Sender double whose failure mode can be flipped mid-test.
#[derive(Debug, Default)]
pub struct FlakySender {
    pub failing: AtomicBool,
    pub calls: AtomicU32,
}

impl FlakySender {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSender for FlakySender {
    async fn send(&self, _recipient: &str, _message: &str) -> Result<DeliveryOutcome, SendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(SendError("provider unreachable".into()))
        } else {
            Ok(DeliveryOutcome {
                delivered: true,
                provider_reference: Some("msg-ref".into()),
            })
        }
    }
}

pub struct TestApp {
    pub ledger: StockLedgerService,
    pub alerts: Arc<AlertService>,
    pub sender: Arc<FlakySender>,
}

pub async fn spawn_app() -> TestApp {
    let pool = establish_connection("sqlite::memory:")
        .await
        .expect("connect to in-memory database");
    run_migrations(&pool).await.expect("run migrations");
    let db = Arc::new(pool);

    let (tx, rx) = mpsc::channel(1024);
    let event_sender = EventSender::new(tx);
    tokio::spawn(restock_api::events::process_events(rx));

    let sender = Arc::new(FlakySender::default());
    let alerts = Arc::new(AlertService::new(
        db.clone(),
        event_sender.clone(),
        sender.clone(),
        AlertPolicyConfig::default(),
    ));
    let ledger = StockLedgerService::new(
        db.clone(),
        event_sender,
        alerts.clone(),
        StockPolicy::default(),
    );

    TestApp {
        ledger,
        alerts,
        sender,
    }
}

impl TestApp {
    /// Registers a location and returns its id.
    pub async fn location(&self, name: &str) -> Uuid {
        self.ledger
            .create_location(name.to_string(), None, "+61400000000".to_string(), None)
            .await
            .expect("create location")
            .id
    }

    /// Provisions a record with sane defaults for a healthy stock position.
    pub async fn provision(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        current_stock: i32,
        minimum_stock: i32,
        maximum_stock: i32,
    ) -> restock_api::entities::inventory_record::Model {
        self.ledger
            .provision_record(ProvisionRecordCommand {
                product_id,
                location_id,
                current_stock,
                minimum_stock,
                maximum_stock,
                ideal_stock_percentage: 80,
                restock_cycle_days: 14,
                average_daily_sales: Decimal::new(20, 1),
                unit_cost: Decimal::new(500, 2),
                retail_price: Decimal::new(999, 2),
            })
            .await
            .expect("provision record")
    }
}

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        inventory_record::{self, Entity as InventoryRecord},
        stock_movement::{self, Entity as StockMovement, MovementType},
        store_location::{self, Entity as StoreLocation},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::alerts::AlertService,
    stock_health::{classify, schedule, RestockCadence, RestockPlan, StockAssessment, StockPolicy},
};

/// Request to apply one stock movement.
#[derive(Debug, Clone)]
pub struct ApplyMovementCommand {
    pub product_id: Uuid,
    pub from_location_id: Option<Uuid>,
    pub to_location_id: Option<Uuid>,
    pub quantity: i32,
    pub movement_type: MovementType,
    /// Defaults to today when absent
    pub movement_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub created_by: Option<String>,
}

/// Request to provision stock tracking for a (product, location) pair.
#[derive(Debug, Clone, Validate)]
pub struct ProvisionRecordCommand {
    pub product_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 0))]
    pub current_stock: i32,
    #[validate(range(min = 0))]
    pub minimum_stock: i32,
    pub maximum_stock: i32,
    #[validate(range(min = 0, max = 100))]
    pub ideal_stock_percentage: i32,
    #[validate(range(min = 1))]
    pub restock_cycle_days: i32,
    pub average_daily_sales: Decimal,
    pub unit_cost: Decimal,
    pub retail_price: Decimal,
}

/// Updated records and the audit row produced by one movement.
#[derive(Debug, Clone)]
pub struct MovementOutcome {
    pub movement: stock_movement::Model,
    pub source: Option<inventory_record::Model>,
    pub destination: Option<inventory_record::Model>,
}

/// Caller-facing status view: the record plus fields derived as of today.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InventoryStatus {
    pub record: inventory_record::Model,
    pub ideal_stock: i32,
    pub stock_value: Decimal,
    pub potential_revenue: Decimal,
    pub suggested_quantity: i32,
    pub cadence: RestockCadence,
}

/// Recomputes every derived column on a record from its base fields.
///
/// Scheduling runs first so the classifier sees a fresh next_restock_date.
/// Called inside the same critical section as each mutation; derived state
/// is never allowed to go stale.
pub fn refresh_derived(
    record: &mut inventory_record::Model,
    policy: &StockPolicy,
    today: NaiveDate,
) -> (StockAssessment, RestockPlan) {
    let plan = schedule(record, policy, today);
    record.next_restock_date = plan.next_restock_date;
    record.days_until_stockout = plan.days_until_stockout.map(|d| d as i32);
    record.projected_stockout_date = plan.projected_stockout_date;

    let assessment = classify(record, policy, today);
    record.stock_status = assessment.status.as_ref().to_string();
    record.needs_restock = assessment.needs_restock;
    record.restock_trigger_reason = assessment.trigger_reason.map(|t| t.as_ref().to_string());
    record.updated_at = Utc::now();

    (assessment, plan)
}

type PairKey = (Uuid, Uuid);

/// The single mutating surface over inventory records.
///
/// Serializes concurrent movements per (product, location) pair with an
/// in-process lock map; two-pair transfers take their locks in sorted key
/// order so opposing transfers cannot deadlock.
#[derive(Clone)]
pub struct StockLedgerService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    alert_service: Arc<AlertService>,
    stock_policy: StockPolicy,
    pair_locks: Arc<DashMap<PairKey, Arc<Mutex<()>>>>,
}

impl StockLedgerService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        alert_service: Arc<AlertService>,
        stock_policy: StockPolicy,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            alert_service,
            stock_policy,
            pair_locks: Arc::new(DashMap::new()),
        }
    }

    async fn lock_pairs(&self, keys: &[PairKey]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted: Vec<PairKey> = keys.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for key in sorted {
            let lock = self
                .pair_locks
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            guards.push(lock.lock_owned().await);
        }
        guards
    }

    fn validate(command: &ApplyMovementCommand) -> Result<(), ServiceError> {
        if command.from_location_id.is_none() && command.to_location_id.is_none() {
            return Err(ServiceError::ValidationError(
                "movement requires a source or destination location".into(),
            ));
        }
        if command.from_location_id.is_some()
            && command.from_location_id == command.to_location_id
        {
            return Err(ServiceError::ValidationError(
                "source and destination locations must differ".into(),
            ));
        }
        match command.movement_type {
            MovementType::Adjustment => {
                if command.to_location_id.is_none() {
                    return Err(ServiceError::ValidationError(
                        "adjustment requires a destination location".into(),
                    ));
                }
                if command.from_location_id.is_some() {
                    return Err(ServiceError::ValidationError(
                        "adjustment targets a single location".into(),
                    ));
                }
                if command.quantity < 0 {
                    return Err(ServiceError::ValidationError(
                        "adjustment sets an absolute stock level and cannot be negative".into(),
                    ));
                }
            }
            _ => {
                if command.quantity <= 0 {
                    return Err(ServiceError::ValidationError(
                        "movement quantity must be positive".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Applies a stock movement atomically: validates, mutates the touched
    /// records, writes the audit row with before/after snapshots, refreshes
    /// derived fields and raises alerts, all inside one transaction under
    /// the per-pair locks.
    #[instrument(skip(self))]
    pub async fn apply_movement(
        &self,
        command: ApplyMovementCommand,
    ) -> Result<MovementOutcome, ServiceError> {
        Self::validate(&command)?;

        let mut keys = Vec::new();
        if let Some(from) = command.from_location_id {
            keys.push((command.product_id, from));
        }
        if let Some(to) = command.to_location_id {
            keys.push((command.product_id, to));
        }
        let _guards = self.lock_pairs(&keys).await;

        let db = self.db_pool.as_ref();
        let policy = self.stock_policy.clone();
        let alert_service = self.alert_service.clone();
        let cmd = command.clone();
        let today = Utc::now().date_naive();
        let movement_date = cmd.movement_date.unwrap_or(today);

        let (outcome, raised, status_changes) = db
            .transaction::<_, (MovementOutcome, Vec<Event>, Vec<Event>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let mut source = match cmd.from_location_id {
                            Some(loc) => Some(load_record(txn, cmd.product_id, loc).await?),
                            None => None,
                        };
                        let mut destination = match cmd.to_location_id {
                            Some(loc) => Some(load_record(txn, cmd.product_id, loc).await?),
                            None => None,
                        };

                        let source_before = source.as_ref().map(|r| r.current_stock);
                        let destination_before = destination.as_ref().map(|r| r.current_stock);

                        match cmd.movement_type {
                            MovementType::Adjustment => {
                                // Absolute set, exempt from the insufficient-stock check.
                                if let Some(record) = destination.as_mut() {
                                    record.current_stock = cmd.quantity;
                                }
                            }
                            _ => {
                                if let Some(record) = source.as_mut() {
                                    if record.current_stock - cmd.quantity < 0 {
                                        return Err(ServiceError::InsufficientStock(format!(
                                            "{} requested, {} on hand at location {}",
                                            cmd.quantity,
                                            record.current_stock,
                                            record.location_id
                                        )));
                                    }
                                    record.current_stock -= cmd.quantity;
                                }
                                if let Some(record) = destination.as_mut() {
                                    record.current_stock += cmd.quantity;
                                    if cmd.movement_type.is_restock() {
                                        record.last_restock_date = Some(movement_date);
                                    }
                                }
                            }
                        }

                        let mut status_changes = Vec::new();
                        let mut raised = Vec::new();

                        for record in [source.as_mut(), destination.as_mut()]
                            .into_iter()
                            .flatten()
                        {
                            let old_status = record.stock_status.clone();
                            let (assessment, plan) =
                                refresh_derived(record, &policy, today);
                            persist_record(txn, record).await?;

                            if old_status != record.stock_status {
                                status_changes.push(Event::StockStatusChanged {
                                    product_id: record.product_id,
                                    location_id: record.location_id,
                                    old_status,
                                    new_status: record.stock_status.clone(),
                                });
                            }

                            let emergency = cmd.movement_type == MovementType::Emergency
                                && Some(record.location_id) == cmd.to_location_id;
                            let alerts = alert_service
                                .generate_for_record(txn, record, &assessment, &plan, emergency)
                                .await?;
                            raised.extend(alerts.into_iter().map(|a| Event::AlertRaised {
                                alert_id: a.id,
                                alert_type: a.alert_type,
                                priority: a.priority,
                            }));
                        }

                        let movement = stock_movement::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            product_id: Set(cmd.product_id),
                            from_location_id: Set(cmd.from_location_id),
                            to_location_id: Set(cmd.to_location_id),
                            quantity: Set(cmd.quantity),
                            movement_type: Set(cmd.movement_type.as_ref().to_string()),
                            movement_date: Set(movement_date),
                            reason: Set(cmd.reason.clone()),
                            created_by: Set(cmd.created_by.clone()),
                            source_stock_before: Set(source_before),
                            source_stock_after: Set(source.as_ref().map(|r| r.current_stock)),
                            destination_stock_before: Set(destination_before),
                            destination_stock_after: Set(destination
                                .as_ref()
                                .map(|r| r.current_stock)),
                            created_at: Set(Utc::now()),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                        info!(
                            movement_id = %movement.id,
                            movement_type = %movement.movement_type,
                            quantity = movement.quantity,
                            "Applied stock movement"
                        );

                        Ok((
                            MovementOutcome {
                                movement,
                                source,
                                destination,
                            },
                            raised,
                            status_changes,
                        ))
                    })
                },
            )
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        // Events go out only once the transaction has committed.
        self.event_sender
            .send(Event::MovementApplied {
                movement_id: outcome.movement.id,
                product_id: outcome.movement.product_id,
                movement_type: outcome.movement.movement_type.clone(),
                quantity: outcome.movement.quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;
        for event in status_changes.into_iter().chain(raised) {
            self.event_sender
                .send(event)
                .await
                .map_err(ServiceError::EventError)?;
        }

        Ok(outcome)
    }

    /// Creates the inventory record for a newly provisioned (product,
    /// location) pair, with derived fields computed up front.
    #[instrument(skip(self))]
    pub async fn provision_record(
        &self,
        command: ProvisionRecordCommand,
    ) -> Result<inventory_record::Model, ServiceError> {
        command.validate()?;
        if command.minimum_stock > command.maximum_stock {
            return Err(ServiceError::ValidationError(
                "minimum_stock cannot exceed maximum_stock".into(),
            ));
        }
        if command.retail_price < command.unit_cost {
            return Err(ServiceError::ValidationError(
                "retail_price cannot be below unit_cost".into(),
            ));
        }
        if command.average_daily_sales < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "average_daily_sales cannot be negative".into(),
            ));
        }

        let _guard = self
            .lock_pairs(&[(command.product_id, command.location_id)])
            .await;

        let db = self.db_pool.as_ref();
        let existing = InventoryRecord::find()
            .filter(inventory_record::Column::ProductId.eq(command.product_id))
            .filter(inventory_record::Column::LocationId.eq(command.location_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "inventory record already exists for product {} at location {}",
                command.product_id, command.location_id
            )));
        }

        let now = Utc::now();
        let mut record = inventory_record::Model {
            id: Uuid::new_v4(),
            product_id: command.product_id,
            location_id: command.location_id,
            current_stock: command.current_stock,
            minimum_stock: command.minimum_stock,
            maximum_stock: command.maximum_stock,
            ideal_stock_percentage: command.ideal_stock_percentage,
            restock_cycle_days: command.restock_cycle_days,
            last_restock_date: None,
            next_restock_date: None,
            average_daily_sales: command.average_daily_sales,
            unit_cost: command.unit_cost,
            retail_price: command.retail_price,
            stock_status: String::new(),
            needs_restock: false,
            restock_trigger_reason: None,
            days_until_stockout: None,
            projected_stockout_date: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        refresh_derived(&mut record, &self.stock_policy, now.date_naive());

        let inserted = inventory_record::ActiveModel {
            id: Set(record.id),
            product_id: Set(record.product_id),
            location_id: Set(record.location_id),
            current_stock: Set(record.current_stock),
            minimum_stock: Set(record.minimum_stock),
            maximum_stock: Set(record.maximum_stock),
            ideal_stock_percentage: Set(record.ideal_stock_percentage),
            restock_cycle_days: Set(record.restock_cycle_days),
            last_restock_date: Set(record.last_restock_date),
            next_restock_date: Set(record.next_restock_date),
            average_daily_sales: Set(record.average_daily_sales),
            unit_cost: Set(record.unit_cost),
            retail_price: Set(record.retail_price),
            stock_status: Set(record.stock_status.clone()),
            needs_restock: Set(record.needs_restock),
            restock_trigger_reason: Set(record.restock_trigger_reason.clone()),
            days_until_stockout: Set(record.days_until_stockout),
            projected_stockout_date: Set(record.projected_stockout_date),
            active: Set(true),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::RecordProvisioned {
                product_id: inserted.product_id,
                location_id: inserted.location_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(inserted)
    }

    /// Marks a record inactive. Records are never physically deleted while
    /// the pair remains known; history stays queryable.
    #[instrument(skip(self))]
    pub async fn deactivate_record(
        &self,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<inventory_record::Model, ServiceError> {
        let _guard = self.lock_pairs(&[(product_id, location_id)]).await;
        let db = self.db_pool.as_ref();
        let record = load_record(db, product_id, location_id).await?;

        let mut active: inventory_record::ActiveModel = record.into();
        active.active = Set(false);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Returns the record plus its derived view recomputed as of today.
    /// Read-only; stored derived columns are refreshed by mutations.
    #[instrument(skip(self))]
    pub async fn get_inventory_status(
        &self,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<InventoryStatus, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut record = load_record(db, product_id, location_id).await?;

        let today = Utc::now().date_naive();
        let (_, plan) = refresh_derived(&mut record, &self.stock_policy, today);

        Ok(InventoryStatus {
            ideal_stock: record.ideal_stock(),
            stock_value: record.stock_value(),
            potential_revenue: record.potential_revenue(),
            suggested_quantity: plan.suggested_quantity,
            cadence: plan.cadence,
            record,
        })
    }

    /// Records the presentation layer should surface: low or critical stock,
    /// or anything flagged for restock.
    #[instrument(skip(self))]
    pub async fn list_attention_records(
        &self,
    ) -> Result<Vec<inventory_record::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        InventoryRecord::find()
            .filter(inventory_record::Column::Active.eq(true))
            .filter(
                Condition::any()
                    .add(inventory_record::Column::StockStatus.eq("critical"))
                    .add(inventory_record::Column::StockStatus.eq("low"))
                    .add(inventory_record::Column::NeedsRestock.eq(true)),
            )
            .order_by_asc(inventory_record::Column::CurrentStock)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Paginated movement history for one (product, location) pair.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_movement::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let paginator = StockMovement::find()
            .filter(stock_movement::Column::ProductId.eq(product_id))
            .filter(
                Condition::any()
                    .add(stock_movement::Column::FromLocationId.eq(location_id))
                    .add(stock_movement::Column::ToLocationId.eq(location_id)),
            )
            .order_by_desc(stock_movement::Column::CreatedAt)
            .paginate(db, limit.max(1));

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((items, total))
    }

    /// Registers a store location.
    #[instrument(skip(self))]
    pub async fn create_location(
        &self,
        name: String,
        contact_name: Option<String>,
        contact_phone: String,
        address: Option<String>,
    ) -> Result<store_location::Model, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "location name must not be empty".into(),
            ));
        }
        if contact_phone.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "contact phone must not be empty".into(),
            ));
        }

        let now = Utc::now();
        store_location::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            contact_name: Set(contact_name),
            contact_phone: Set(contact_phone),
            address: Set(address),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn list_locations(&self) -> Result<Vec<store_location::Model>, ServiceError> {
        StoreLocation::find()
            .order_by_asc(store_location::Column::Name)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Active roster size; the default store count for hub scenarios.
    pub async fn count_active_locations(&self) -> Result<u64, ServiceError> {
        StoreLocation::find()
            .filter(store_location::Column::Active.eq(true))
            .count(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}

async fn load_record<C: sea_orm::ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    location_id: Uuid,
) -> Result<inventory_record::Model, ServiceError> {
    InventoryRecord::find()
        .filter(inventory_record::Column::ProductId.eq(product_id))
        .filter(inventory_record::Column::LocationId.eq(location_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "inventory record for product {} at location {}",
                product_id, location_id
            ))
        })
}

async fn persist_record<C: sea_orm::ConnectionTrait>(
    conn: &C,
    record: &inventory_record::Model,
) -> Result<(), ServiceError> {
    let active = inventory_record::ActiveModel {
        id: sea_orm::Unchanged(record.id),
        current_stock: Set(record.current_stock),
        last_restock_date: Set(record.last_restock_date),
        next_restock_date: Set(record.next_restock_date),
        stock_status: Set(record.stock_status.clone()),
        needs_restock: Set(record.needs_restock),
        restock_trigger_reason: Set(record.restock_trigger_reason.clone()),
        days_until_stockout: Set(record.days_until_stockout),
        projected_stockout_date: Set(record.projected_stockout_date),
        updated_at: Set(record.updated_at),
        ..Default::default()
    };
    active.update(conn).await.map_err(ServiceError::db_error)?;
    Ok(())
}

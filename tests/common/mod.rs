#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

use facilityops_api::{
    db::{self, DbConfig},
    entities::{part, stock_movement::MovementType, supplier},
    events::{self, EventSender},
    services::{
        availability::{AvailabilityService, NullDemandFeed},
        catalog::{CatalogService, NewPart, NewSupplier},
        replenishment::ReplenishmentService,
        stock_ledger::{RecordMovement, StockLedgerService},
    },
};

pub struct TestContext {
    pub db: Arc<db::DbPool>,
    pub ledger: StockLedgerService,
    pub availability: AvailabilityService,
    pub catalog: CatalogService,
    pub replenishment: ReplenishmentService,
}

pub async fn setup() -> TestContext {
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let pool = db::establish_connection_with_config(&config)
        .await
        .expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");
    let db = Arc::new(pool);

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(events::process_events(rx));
    let sender = EventSender::new(tx);

    TestContext {
        ledger: StockLedgerService::new(db.clone(), Some(sender.clone())),
        availability: AvailabilityService::new(db.clone(), Arc::new(NullDemandFeed)),
        catalog: CatalogService::new(db.clone()),
        replenishment: ReplenishmentService::new(db.clone(), Some(sender)),
        db,
    }
}

pub async fn seed_supplier(ctx: &TestContext, customer_id: Uuid, name: &str) -> supplier::Model {
    ctx.catalog
        .create_supplier(NewSupplier {
            customer_id,
            name: name.to_string(),
            contact_name: None,
            email: None,
            phone: None,
        })
        .await
        .expect("create supplier")
}

/// Creates a part and brings it to `current` through a seed inbound movement
/// so the audit trail stays consistent with the quantity.
pub async fn seed_part(
    ctx: &TestContext,
    customer_id: Uuid,
    name: &str,
    minimum: Decimal,
    maximum: Option<Decimal>,
    current: Decimal,
    cost_price: Decimal,
    supplier_id: Option<Uuid>,
) -> part::Model {
    let created = ctx
        .catalog
        .create_part(NewPart {
            customer_id,
            company_id: Uuid::new_v4(),
            module: "maintenance".to_string(),
            name: name.to_string(),
            part_number: None,
            unit: "pc".to_string(),
            minimum_quantity: minimum,
            maximum_quantity: maximum,
            cost_price,
            supplier_id,
        })
        .await
        .expect("create part");

    if current > Decimal::ZERO {
        ctx.ledger
            .record_movement(RecordMovement {
                part_id: created.id,
                movement_type: MovementType::Inbound,
                magnitude: current,
                reason: Some("initial stock intake".to_string()),
                actor: "seed".to_string(),
            })
            .await
            .expect("seed stock");
    }

    ctx.ledger.get_part(created.id).await.expect("reload part")
}

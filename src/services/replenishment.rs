use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{
        part,
        replenishment_order::{self, OrderSource, ReplenishmentStatus},
        replenishment_order_item, stock_movement,
        stock_movement::MovementType,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock_ledger::{RecordMovement, StockLedgerService},
};

/// One line of a new order: how much of which part to request.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub part_id: Uuid,
    pub quantity_requested: Decimal,
}

/// Per-item quantity override used by the confirm and ship transitions.
#[derive(Debug, Clone)]
pub struct ItemQuantity {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

/// What a planner run did, for caller reporting. Skipped parts are reported,
/// not raised: a missing supplier is a data gap, not a failure.
#[derive(Debug, Clone, Serialize)]
pub struct PlannerSummary {
    pub orders_created: usize,
    pub total_value: Decimal,
    pub skipped_missing_supplier: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: replenishment_order::Model,
    pub items: Vec<replenishment_order_item::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptResult {
    #[serde(flatten)]
    pub order: replenishment_order::Model,
    pub movements: Vec<stock_movement::Model>,
}

/// Supplier replenishment: shortage scanning, order creation, and the order
/// lifecycle through receipt. Receipt is the one transition that reaches back
/// into the stock ledger, and it does so inside a single transaction.
#[derive(Clone)]
pub struct ReplenishmentService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl ReplenishmentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Scans a customer's active parts for physical shortage, groups the hits
    /// by supplier, and creates one pending order per supplier. Each supplier
    /// group commits independently so one bad group cannot block the rest.
    ///
    /// Running this twice while shortages persist creates duplicate orders;
    /// callers are expected to check open orders per part first.
    #[instrument(skip(self))]
    pub async fn generate_replenishment_orders(
        &self,
        customer_id: Uuid,
    ) -> Result<PlannerSummary, ServiceError> {
        let parts = part::Entity::find()
            .filter(part::Column::CustomerId.eq(customer_id))
            .filter(part::Column::IsActive.eq(true))
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut groups: BTreeMap<Uuid, Vec<part::Model>> = BTreeMap::new();
        let mut skipped_missing_supplier = Vec::new();
        for part in parts {
            if part.current_quantity >= part.minimum_quantity {
                continue;
            }
            match part.supplier_id {
                Some(supplier_id) => groups.entry(supplier_id).or_default().push(part),
                None => {
                    warn!(part_id = %part.id, "Low-stock part has no supplier; skipping");
                    skipped_missing_supplier.push(part.id);
                }
            }
        }

        let mut orders_created = 0;
        let mut total_value = Decimal::ZERO;
        for (supplier_id, group) in groups {
            let items: Vec<NewOrderItem> = group
                .iter()
                .map(|part| NewOrderItem {
                    part_id: part.id,
                    quantity_requested: refill_target(part) - part.current_quantity,
                })
                .collect();

            match self
                .create_order(customer_id, supplier_id, OrderSource::Auto, &items)
                .await
            {
                Ok((order, value)) => {
                    orders_created += 1;
                    total_value += value;
                    info!(
                        order_id = %order.id,
                        %supplier_id,
                        items = items.len(),
                        "Replenishment order generated"
                    );
                }
                Err(e) => {
                    error!(%supplier_id, error = %e, "Supplier group failed; continuing with the rest");
                }
            }
        }

        Ok(PlannerSummary {
            orders_created,
            total_value,
            skipped_missing_supplier,
        })
    }

    /// Manually sized order, same insert path the planner uses.
    #[instrument(skip(self))]
    pub async fn create_manual_order(
        &self,
        customer_id: Uuid,
        supplier_id: Uuid,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderWithItems, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::ValidationError(
                "an order needs at least one item".to_string(),
            ));
        }
        let (order, _) = self
            .create_order(customer_id, supplier_id, OrderSource::Manual, &items)
            .await?;
        self.get_order(order.id).await
    }

    async fn create_order(
        &self,
        customer_id: Uuid,
        supplier_id: Uuid,
        source: OrderSource,
        items: &[NewOrderItem],
    ) -> Result<(replenishment_order::Model, Decimal), ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let supplier = crate::entities::supplier::Entity::find_by_id(supplier_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", supplier_id)))?;
        if supplier.customer_id != customer_id {
            return Err(ServiceError::NotFound(format!(
                "Supplier {} not found",
                supplier_id
            )));
        }

        let now = Utc::now();
        let order = replenishment_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            supplier_id: Set(supplier_id),
            order_number: Set(next_order_number()),
            status: Set(ReplenishmentStatus::Pending.as_str().to_string()),
            source: Set(source.as_str().to_string()),
            tracking_code: Set(None),
            created_at: Set(now),
            confirmed_at: Set(None),
            shipped_at: Set(None),
            received_at: Set(None),
            received_by: Set(None),
            received_notes: Set(None),
            version: Set(0),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        let mut total_value = Decimal::ZERO;
        for item in items {
            if item.quantity_requested <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "requested quantity for part {} must be positive",
                    item.part_id
                )));
            }

            let part = part::Entity::find_by_id(item.part_id)
                .one(&txn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Part {} not found", item.part_id))
                })?;
            if part.customer_id != customer_id {
                return Err(ServiceError::NotFound(format!(
                    "Part {} not found",
                    item.part_id
                )));
            }
            if !part.is_active {
                return Err(ServiceError::PartInactive(part.id));
            }

            total_value += item.quantity_requested * part.cost_price;

            replenishment_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                part_id: Set(item.part_id),
                quantity_requested: Set(item.quantity_requested),
                quantity_confirmed: Set(None),
                quantity_shipped: Set(None),
                quantity_received: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .emit(Event::ReplenishmentOrderCreated {
                    order_id: order.id,
                    supplier_id,
                    source: order.source.clone(),
                    item_count: items.len(),
                })
                .await;
        }

        Ok((order, total_value))
    }

    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        customer_id: Uuid,
        status: Option<ReplenishmentStatus>,
    ) -> Result<Vec<OrderWithItems>, ServiceError> {
        let mut query = replenishment_order::Entity::find()
            .filter(replenishment_order::Column::CustomerId.eq(customer_id));
        if let Some(status) = status {
            query = query.filter(replenishment_order::Column::Status.eq(status.as_str()));
        }

        let rows = query
            .order_by_desc(replenishment_order::Column::CreatedAt)
            .find_with_related(replenishment_order_item::Entity)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .map(|(order, items)| OrderWithItems { order, items })
            .collect())
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderWithItems, ServiceError> {
        let order = replenishment_order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Replenishment order {} not found", order_id))
            })?;

        let items = replenishment_order_item::Entity::find()
            .filter(replenishment_order_item::Column::OrderId.eq(order_id))
            .order_by_asc(replenishment_order_item::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(OrderWithItems { order, items })
    }

    /// Supplier accepted the order. Item quantities default to what was
    /// requested unless the supplier adjusted them.
    #[instrument(skip(self))]
    pub async fn confirm_order(
        &self,
        order_id: Uuid,
        confirmations: Vec<ItemQuantity>,
    ) -> Result<OrderWithItems, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let order = Self::load_order(&txn, order_id).await?;
        let current = require_transition(&order, ReplenishmentStatus::Confirmed)?;

        let now = Utc::now();
        let updated = replenishment_order::Entity::update_many()
            .col_expr(
                replenishment_order::Column::Status,
                Expr::value(ReplenishmentStatus::Confirmed.as_str()),
            )
            .col_expr(replenishment_order::Column::ConfirmedAt, Expr::value(now))
            .col_expr(
                replenishment_order::Column::Version,
                Expr::value(order.version + 1),
            )
            .col_expr(replenishment_order::Column::UpdatedAt, Expr::value(now))
            .filter(replenishment_order::Column::Id.eq(order.id))
            .filter(replenishment_order::Column::Version.eq(order.version))
            .filter(replenishment_order::Column::Status.eq(current.as_str()))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if updated.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "order {} was modified concurrently",
                order.order_number
            )));
        }

        let items = replenishment_order_item::Entity::find()
            .filter(replenishment_order_item::Column::OrderId.eq(order.id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        for item in items {
            let quantity = confirmations
                .iter()
                .find(|c| c.item_id == item.id)
                .map(|c| c.quantity)
                .unwrap_or(item.quantity_requested);
            if quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "confirmed quantity for item {} cannot be negative",
                    item.id
                )));
            }
            let mut active: replenishment_order_item::ActiveModel = item.into();
            active.quantity_confirmed = Set(Some(quantity));
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(ServiceError::db_error)?;
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .emit(Event::ReplenishmentOrderConfirmed {
                    order_id: order.id,
                    confirmed_at: now,
                })
                .await;
        }

        self.get_order(order_id).await
    }

    /// Supplier dispatched the order; tracking becomes available here.
    #[instrument(skip(self))]
    pub async fn ship_order(
        &self,
        order_id: Uuid,
        tracking_code: Option<String>,
        shipments: Vec<ItemQuantity>,
    ) -> Result<OrderWithItems, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let order = Self::load_order(&txn, order_id).await?;
        let current = require_transition(&order, ReplenishmentStatus::Shipped)?;

        let now = Utc::now();
        let updated = replenishment_order::Entity::update_many()
            .col_expr(
                replenishment_order::Column::Status,
                Expr::value(ReplenishmentStatus::Shipped.as_str()),
            )
            .col_expr(replenishment_order::Column::ShippedAt, Expr::value(now))
            .col_expr(
                replenishment_order::Column::TrackingCode,
                Expr::value(tracking_code.clone()),
            )
            .col_expr(
                replenishment_order::Column::Version,
                Expr::value(order.version + 1),
            )
            .col_expr(replenishment_order::Column::UpdatedAt, Expr::value(now))
            .filter(replenishment_order::Column::Id.eq(order.id))
            .filter(replenishment_order::Column::Version.eq(order.version))
            .filter(replenishment_order::Column::Status.eq(current.as_str()))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if updated.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "order {} was modified concurrently",
                order.order_number
            )));
        }

        for shipment in &shipments {
            if shipment.quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "shipped quantity for item {} cannot be negative",
                    shipment.item_id
                )));
            }
            let item = replenishment_order_item::Entity::find_by_id(shipment.item_id)
                .one(&txn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Order item {} not found", shipment.item_id))
                })?;
            if item.order_id != order.id {
                return Err(ServiceError::ValidationError(format!(
                    "item {} does not belong to order {}",
                    shipment.item_id, order.order_number
                )));
            }
            let mut active: replenishment_order_item::ActiveModel = item.into();
            active.quantity_shipped = Set(Some(shipment.quantity));
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(ServiceError::db_error)?;
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .emit(Event::ReplenishmentOrderShipped {
                    order_id: order.id,
                    tracking_code,
                })
                .await;
        }

        self.get_order(order_id).await
    }

    /// Cancels a not-yet-received order. No stock effect.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<OrderWithItems, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let order = Self::load_order(&txn, order_id).await?;
        let current = require_transition(&order, ReplenishmentStatus::Cancelled)?;

        let now = Utc::now();
        let updated = replenishment_order::Entity::update_many()
            .col_expr(
                replenishment_order::Column::Status,
                Expr::value(ReplenishmentStatus::Cancelled.as_str()),
            )
            .col_expr(
                replenishment_order::Column::Version,
                Expr::value(order.version + 1),
            )
            .col_expr(replenishment_order::Column::UpdatedAt, Expr::value(now))
            .filter(replenishment_order::Column::Id.eq(order.id))
            .filter(replenishment_order::Column::Version.eq(order.version))
            .filter(replenishment_order::Column::Status.eq(current.as_str()))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if updated.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "order {} was modified concurrently",
                order.order_number
            )));
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .emit(Event::ReplenishmentOrderCancelled { order_id: order.id })
                .await;
        }

        self.get_order(order_id).await
    }

    /// The terminal receipt transition: posts one inbound movement per item
    /// and closes the order, all-or-nothing.
    ///
    /// Deliberately not idempotent: a repeat call finds the order already
    /// `recebido` and fails with `InvalidTransition` instead of silently
    /// double-posting stock. If any item's movement fails the whole
    /// transaction rolls back and the order stays `enviado`.
    #[instrument(skip(self))]
    pub async fn confirm_receipt(
        &self,
        order_id: Uuid,
        notes: Option<String>,
        actor: &str,
    ) -> Result<ReceiptResult, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let order = Self::load_order(&txn, order_id).await?;

        let current = order.status().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "order {} has unknown status '{}'",
                order.id, order.status
            ))
        })?;
        if current != ReplenishmentStatus::Shipped || order.received_at.is_some() {
            return Err(ServiceError::InvalidTransition(format!(
                "order {} cannot be received from status '{}'",
                order.order_number, order.status
            )));
        }

        let now = Utc::now();
        // Claim the order row first: two concurrent receipts cannot both pass
        // the precondition once one of them has flipped status and version.
        let updated = replenishment_order::Entity::update_many()
            .col_expr(
                replenishment_order::Column::Status,
                Expr::value(ReplenishmentStatus::Received.as_str()),
            )
            .col_expr(replenishment_order::Column::ReceivedAt, Expr::value(now))
            .col_expr(replenishment_order::Column::ReceivedBy, Expr::value(actor))
            .col_expr(
                replenishment_order::Column::ReceivedNotes,
                Expr::value(notes.clone()),
            )
            .col_expr(
                replenishment_order::Column::Version,
                Expr::value(order.version + 1),
            )
            .col_expr(replenishment_order::Column::UpdatedAt, Expr::value(now))
            .filter(replenishment_order::Column::Id.eq(order.id))
            .filter(replenishment_order::Column::Version.eq(order.version))
            .filter(
                replenishment_order::Column::Status.eq(ReplenishmentStatus::Shipped.as_str()),
            )
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if updated.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "order {} was modified concurrently",
                order.order_number
            )));
        }

        let items = replenishment_order_item::Entity::find()
            .filter(replenishment_order_item::Column::OrderId.eq(order.id))
            .order_by_asc(replenishment_order_item::Column::CreatedAt)
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let mut movements = Vec::with_capacity(items.len());
        for item in items {
            let quantity = item.receivable_quantity();
            let (movement, _) = StockLedgerService::apply_movement(
                &txn,
                &RecordMovement {
                    part_id: item.part_id,
                    movement_type: MovementType::Inbound,
                    magnitude: quantity,
                    reason: Some(format!("Receipt of order {}", order.order_number)),
                    actor: actor.to_string(),
                },
            )
            .await?;

            let mut active: replenishment_order_item::ActiveModel = item.into();
            active.quantity_received = Set(Some(quantity));
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(ServiceError::db_error)?;

            movements.push(movement);
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            movements = movements.len(),
            "Replenishment order received; stock posted"
        );

        if let Some(sender) = &self.event_sender {
            sender
                .emit(Event::ReplenishmentOrderReceived {
                    order_id: order.id,
                    movements_posted: movements.len(),
                })
                .await;
        }

        let received = self.get_order(order_id).await?;
        Ok(ReceiptResult {
            order: received.order,
            movements,
        })
    }

    async fn load_order(
        txn: &DatabaseTransaction,
        order_id: Uuid,
    ) -> Result<replenishment_order::Model, ServiceError> {
        replenishment_order::Entity::find_by_id(order_id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Replenishment order {} not found", order_id))
            })
    }
}

/// Refill ceiling for one part. Without a configured maximum the target is
/// twice the minimum, which keeps the requested quantity positive for any
/// part that qualified as low-stock.
fn refill_target(part: &part::Model) -> Decimal {
    match part.maximum_quantity {
        Some(maximum) => maximum.max(part.minimum_quantity),
        None => part.minimum_quantity * Decimal::TWO,
    }
}

fn require_transition(
    order: &replenishment_order::Model,
    next: ReplenishmentStatus,
) -> Result<ReplenishmentStatus, ServiceError> {
    let current = order.status().ok_or_else(|| {
        ServiceError::InternalError(format!(
            "order {} has unknown status '{}'",
            order.id, order.status
        ))
    })?;
    if !current.can_transition_to(next) {
        return Err(ServiceError::InvalidTransition(format!(
            "order {} cannot move from '{}' to '{}'",
            order.order_number,
            current.as_str(),
            next.as_str()
        )));
    }
    Ok(current)
}

fn next_order_number() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("RO-{}", token[..12].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn fixture_part(
        current: Decimal,
        minimum: Decimal,
        maximum: Option<Decimal>,
    ) -> part::Model {
        part::Model {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            module: "maintenance".to_string(),
            name: "V-belt A42".to_string(),
            part_number: None,
            unit: "pc".to_string(),
            current_quantity: current,
            minimum_quantity: minimum,
            maximum_quantity: maximum,
            cost_price: dec!(2.00),
            supplier_id: None,
            is_active: true,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn refill_target_prefers_the_configured_maximum() {
        let part = fixture_part(dec!(5), dec!(10), Some(dec!(100)));
        assert_eq!(refill_target(&part), dec!(100));
        assert_eq!(refill_target(&part) - part.current_quantity, dec!(95));
    }

    #[test]
    fn refill_target_never_drops_below_the_minimum() {
        // A maximum below the minimum is a data-entry mistake; the minimum wins.
        let part = fixture_part(dec!(1), dec!(10), Some(dec!(4)));
        assert_eq!(refill_target(&part), dec!(10));
    }

    #[test]
    fn refill_target_falls_back_to_twice_the_minimum() {
        let part = fixture_part(dec!(4), dec!(10), None);
        assert_eq!(refill_target(&part), dec!(20));
        assert_eq!(refill_target(&part) - part.current_quantity, dec!(16));
    }

    #[test]
    fn order_numbers_carry_the_ro_prefix() {
        let number = next_order_number();
        assert!(number.starts_with("RO-"));
        assert_eq!(number.len(), 15);
    }
}

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        part,
        stock_movement::{self, MovementType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Command to append one movement to a part's ledger. For `Adjustment` the
/// magnitude is the new absolute quantity; for the other kinds it is a delta.
#[derive(Debug, Clone)]
pub struct RecordMovement {
    pub part_id: Uuid,
    pub movement_type: MovementType,
    pub magnitude: Decimal,
    pub reason: Option<String>,
    pub actor: String,
}

/// The only write path for `parts.current_quantity`. Every change lands as a
/// part-row update and a movement row in the same transaction, serialized per
/// part through the `version` counter.
#[derive(Clone)]
pub struct StockLedgerService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl StockLedgerService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Appends a movement and updates the part's quantity atomically.
    ///
    /// A stale `version` at commit time surfaces as `Conflict`; callers retry
    /// with fresh reads. All other errors are terminal for the request.
    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        command: RecordMovement,
    ) -> Result<stock_movement::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let (movement, updated_part) = Self::apply_movement(&txn, &command).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(
            part_id = %movement.part_id,
            movement_type = %movement.movement_type,
            quantity = %movement.quantity,
            new_quantity = %movement.new_quantity,
            "Stock movement recorded"
        );

        if let Some(sender) = &self.event_sender {
            sender
                .emit(Event::StockMovementRecorded {
                    part_id: movement.part_id,
                    movement_id: movement.id,
                    movement_type: movement.movement_type.clone(),
                    quantity: movement.quantity,
                    new_quantity: movement.new_quantity,
                })
                .await;
            if updated_part.current_quantity < updated_part.minimum_quantity {
                sender
                    .emit(Event::LowStockDetected {
                        part_id: updated_part.id,
                        current_quantity: updated_part.current_quantity,
                        minimum_quantity: updated_part.minimum_quantity,
                    })
                    .await;
            }
        }

        Ok(movement)
    }

    /// Ledger core bound to a caller-owned connection. The receipt transition
    /// composes with this so its movements roll back with the order update.
    pub(crate) async fn apply_movement<C>(
        conn: &C,
        command: &RecordMovement,
    ) -> Result<(stock_movement::Model, part::Model), ServiceError>
    where
        C: ConnectionTrait,
    {
        let part = part::Entity::find_by_id(command.part_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", command.part_id)))?;

        if !part.is_active {
            return Err(ServiceError::PartInactive(part.id));
        }

        let previous_quantity = part.current_quantity;
        let new_quantity =
            compute_new_quantity(command.movement_type, previous_quantity, command.magnitude)?;

        let now = Utc::now();
        let updated = part::Entity::update_many()
            .col_expr(part::Column::CurrentQuantity, Expr::value(new_quantity))
            .col_expr(part::Column::Version, Expr::value(part.version + 1))
            .col_expr(part::Column::UpdatedAt, Expr::value(now))
            .filter(part::Column::Id.eq(part.id))
            .filter(part::Column::Version.eq(part.version))
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;

        if updated.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "part {} was modified concurrently",
                part.id
            )));
        }

        let movement = stock_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            part_id: Set(part.id),
            movement_type: Set(command.movement_type.as_str().to_string()),
            quantity: Set(command.magnitude),
            previous_quantity: Set(previous_quantity),
            new_quantity: Set(new_quantity),
            reason: Set(command.reason.clone()),
            actor: Set(command.actor.clone()),
            created_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(ServiceError::db_error)?;

        let updated_part = part::Model {
            current_quantity: new_quantity,
            version: part.version + 1,
            updated_at: now,
            ..part
        };

        Ok((movement, updated_part))
    }

    /// A part's full audit trail, oldest first.
    #[instrument(skip(self))]
    pub async fn movement_history(
        &self,
        part_id: Uuid,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        self.get_part(part_id).await?;

        stock_movement::Entity::find()
            .filter(stock_movement::Column::PartId.eq(part_id))
            .order_by_asc(stock_movement::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_part(&self, part_id: Uuid) -> Result<part::Model, ServiceError> {
        part::Entity::find_by_id(part_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", part_id)))
    }
}

/// Pure movement arithmetic: validates the magnitude and derives the
/// resulting quantity without touching storage.
pub(crate) fn compute_new_quantity(
    movement_type: MovementType,
    previous_quantity: Decimal,
    magnitude: Decimal,
) -> Result<Decimal, ServiceError> {
    if magnitude < Decimal::ZERO {
        return Err(ServiceError::InvalidMagnitude(format!(
            "movement magnitude cannot be negative (got {})",
            magnitude
        )));
    }

    match movement_type {
        MovementType::Inbound => Ok(previous_quantity + magnitude),
        MovementType::Outbound => {
            if magnitude > previous_quantity {
                return Err(ServiceError::InsufficientStock(format!(
                    "requested {} exceeds available {}",
                    magnitude, previous_quantity
                )));
            }
            Ok(previous_quantity - magnitude)
        }
        // Adjustment magnitude is the target absolute value, not a delta.
        MovementType::Adjustment => Ok(magnitude),
    }
}

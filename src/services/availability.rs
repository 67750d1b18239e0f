use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::{
        part,
        replenishment_order::{self, ReplenishmentStatus},
        replenishment_order_item,
    },
    errors::ServiceError,
};

/// Open-work-order commitments are computed by an external planning
/// component; this core only consumes the aggregate per part.
#[async_trait]
pub trait DemandFeed: Send + Sync {
    async fn reserved_quantity_for(&self, part_id: Uuid) -> Result<Decimal, ServiceError>;
}

/// Demand feed for deployments without the planning component wired in.
pub struct NullDemandFeed;

#[async_trait]
impl DemandFeed for NullDemandFeed {
    async fn reserved_quantity_for(&self, _part_id: Uuid) -> Result<Decimal, ServiceError> {
        Ok(Decimal::ZERO)
    }
}

/// Derived availability figures for one part. Read-only decoration of a part
/// snapshot; the ledger's owned fields are never mutated here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Availability {
    pub reserved_quantity: Decimal,
    pub incoming_confirmed_quantity: Decimal,
    pub projected_quantity: Decimal,
    pub is_low_stock: bool,
    pub is_projected_low: bool,
}

impl Availability {
    /// `projected_quantity` may be negative: current stock can be fine while
    /// committed demand already exceeds it.
    pub fn compute(
        part: &part::Model,
        reserved_quantity: Decimal,
        incoming_confirmed_quantity: Decimal,
    ) -> Self {
        let projected_quantity =
            part.current_quantity - reserved_quantity + incoming_confirmed_quantity;
        Self {
            reserved_quantity,
            incoming_confirmed_quantity,
            projected_quantity,
            is_low_stock: part.current_quantity < part.minimum_quantity,
            is_projected_low: projected_quantity <= part.minimum_quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PartWithAvailability {
    #[serde(flatten)]
    pub part: part::Model,
    #[serde(flatten)]
    pub availability: Availability,
}

#[derive(Clone)]
pub struct AvailabilityService {
    db: Arc<DatabaseConnection>,
    demand_feed: Arc<dyn DemandFeed>,
}

impl AvailabilityService {
    pub fn new(db: Arc<DatabaseConnection>, demand_feed: Arc<dyn DemandFeed>) -> Self {
        Self { db, demand_feed }
    }

    pub async fn annotate(&self, part: part::Model) -> Result<PartWithAvailability, ServiceError> {
        let reserved = self.demand_feed.reserved_quantity_for(part.id).await?;
        let incoming = self.incoming_confirmed_quantity(part.id).await?;
        Ok(PartWithAvailability {
            availability: Availability::compute(&part, reserved, incoming),
            part,
        })
    }

    /// Parts for a customer (optionally narrowed to one module), each
    /// annotated with its availability figures.
    #[instrument(skip(self))]
    pub async fn list_parts(
        &self,
        customer_id: Uuid,
        module: Option<String>,
        low_stock_only: bool,
    ) -> Result<Vec<PartWithAvailability>, ServiceError> {
        let mut query = part::Entity::find().filter(part::Column::CustomerId.eq(customer_id));
        if let Some(module) = module {
            query = query.filter(part::Column::Module.eq(module));
        }

        let parts = query
            .order_by_asc(part::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut annotated = Vec::with_capacity(parts.len());
        for part in parts {
            let entry = self.annotate(part).await?;
            if low_stock_only && !entry.availability.is_low_stock {
                continue;
            }
            annotated.push(entry);
        }
        Ok(annotated)
    }

    /// Confirmed-or-shipped quantity still on its way in: the sum of
    /// `quantity_shipped` (falling back to `quantity_confirmed`) across open
    /// replenishment orders referencing the part.
    async fn incoming_confirmed_quantity(&self, part_id: Uuid) -> Result<Decimal, ServiceError> {
        let rows = replenishment_order_item::Entity::find()
            .filter(replenishment_order_item::Column::PartId.eq(part_id))
            .find_also_related(replenishment_order::Entity)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut total = Decimal::ZERO;
        for (item, order) in rows {
            let Some(order) = order else { continue };
            match order.status() {
                Some(ReplenishmentStatus::Confirmed) | Some(ReplenishmentStatus::Shipped) => {
                    total += item
                        .quantity_shipped
                        .or(item.quantity_confirmed)
                        .unwrap_or(Decimal::ZERO);
                }
                _ => {}
            }
        }
        Ok(total)
    }
}

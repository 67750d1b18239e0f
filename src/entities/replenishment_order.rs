use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Replenishment order lifecycle. Persisted under the product's wire names;
/// only the transitions listed in `can_transition_to` are legal, and the
/// receipt transition is the only one with a stock side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplenishmentStatus {
    Pending,
    Confirmed,
    Shipped,
    Received,
    Cancelled,
}

impl ReplenishmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplenishmentStatus::Pending => "pendente",
            ReplenishmentStatus::Confirmed => "confirmado",
            ReplenishmentStatus::Shipped => "enviado",
            ReplenishmentStatus::Received => "recebido",
            ReplenishmentStatus::Cancelled => "cancelado",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pendente" => Some(ReplenishmentStatus::Pending),
            "confirmado" => Some(ReplenishmentStatus::Confirmed),
            "enviado" => Some(ReplenishmentStatus::Shipped),
            "recebido" => Some(ReplenishmentStatus::Received),
            "cancelado" => Some(ReplenishmentStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReplenishmentStatus::Received | ReplenishmentStatus::Cancelled
        )
    }

    /// Forward-only transition table. Any non-terminal status may be
    /// cancelled; everything else advances one step.
    pub fn can_transition_to(&self, next: ReplenishmentStatus) -> bool {
        use ReplenishmentStatus::*;
        match (self, next) {
            (Pending, Confirmed) => true,
            (Confirmed, Shipped) => true,
            (Shipped, Received) => true,
            (Pending | Confirmed | Shipped, Cancelled) => true,
            _ => false,
        }
    }
}

/// How an order came to exist: created by the planner or by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSource {
    Manual,
    Auto,
}

impl OrderSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSource::Manual => "manual",
            OrderSource::Auto => "auto",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(OrderSource::Manual),
            "auto" => Some(OrderSource::Auto),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "replenishment_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub supplier_id: Uuid,
    pub order_number: String,
    pub status: String,
    pub source: String,
    pub tracking_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub received_by: Option<String>,
    pub received_notes: Option<String>,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn status(&self) -> Option<ReplenishmentStatus> {
        ReplenishmentStatus::from_str(&self.status)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::replenishment_order_item::Entity")]
    Items,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::replenishment_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

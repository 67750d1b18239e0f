use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{part, supplier},
    errors::ServiceError,
};

#[derive(Debug, Clone)]
pub struct NewPart {
    pub customer_id: Uuid,
    pub company_id: Uuid,
    pub module: String,
    pub name: String,
    pub part_number: Option<String>,
    pub unit: String,
    pub minimum_quantity: Decimal,
    pub maximum_quantity: Option<Decimal>,
    pub cost_price: Decimal,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct PartUpdate {
    pub module: Option<String>,
    pub name: Option<String>,
    pub part_number: Option<String>,
    pub unit: Option<String>,
    pub minimum_quantity: Option<Decimal>,
    pub maximum_quantity: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub customer_id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Part and supplier catalog. Quantity is deliberately absent from every
/// operation here: parts are created at zero and only the stock ledger moves
/// them, so the movement trail stays complete.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_supplier(
        &self,
        new_supplier: NewSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        if new_supplier.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "supplier name cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let created = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(new_supplier.customer_id),
            name: Set(new_supplier.name),
            contact_name: Set(new_supplier.contact_name),
            email: Set(new_supplier.email),
            phone: Set(new_supplier.phone),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(supplier_id = %created.id, "Supplier created");
        Ok(created)
    }

    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(supplier_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", supplier_id)))
    }

    pub async fn list_suppliers(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<supplier::Model>, ServiceError> {
        supplier::Entity::find()
            .filter(supplier::Column::CustomerId.eq(customer_id))
            .order_by_asc(supplier::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn create_part(&self, new_part: NewPart) -> Result<part::Model, ServiceError> {
        if new_part.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "part name cannot be empty".to_string(),
            ));
        }
        if new_part.minimum_quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "minimum quantity cannot be negative".to_string(),
            ));
        }
        if new_part.cost_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "cost price cannot be negative".to_string(),
            ));
        }
        if let Some(supplier_id) = new_part.supplier_id {
            self.get_supplier(supplier_id).await?;
        }

        let now = Utc::now();
        let created = part::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(new_part.customer_id),
            company_id: Set(new_part.company_id),
            module: Set(new_part.module),
            name: Set(new_part.name),
            part_number: Set(new_part.part_number),
            unit: Set(new_part.unit),
            current_quantity: Set(Decimal::ZERO),
            minimum_quantity: Set(new_part.minimum_quantity),
            maximum_quantity: Set(new_part.maximum_quantity),
            cost_price: Set(new_part.cost_price),
            supplier_id: Set(new_part.supplier_id),
            is_active: Set(true),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(part_id = %created.id, "Part created");
        Ok(created)
    }

    /// Catalog attributes only; `current_quantity` and `version` belong to
    /// the stock ledger and are not touched here.
    #[instrument(skip(self))]
    pub async fn update_part(
        &self,
        part_id: Uuid,
        update: PartUpdate,
    ) -> Result<part::Model, ServiceError> {
        let existing = self.get_part(part_id).await?;

        if let Some(minimum) = update.minimum_quantity {
            if minimum < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "minimum quantity cannot be negative".to_string(),
                ));
            }
        }
        if let Some(cost) = update.cost_price {
            if cost < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "cost price cannot be negative".to_string(),
                ));
            }
        }
        if let Some(supplier_id) = update.supplier_id {
            self.get_supplier(supplier_id).await?;
        }

        let mut active: part::ActiveModel = existing.into();
        if let Some(module) = update.module {
            active.module = Set(module);
        }
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(part_number) = update.part_number {
            active.part_number = Set(Some(part_number));
        }
        if let Some(unit) = update.unit {
            active.unit = Set(unit);
        }
        if let Some(minimum) = update.minimum_quantity {
            active.minimum_quantity = Set(minimum);
        }
        if let Some(maximum) = update.maximum_quantity {
            active.maximum_quantity = Set(Some(maximum));
        }
        if let Some(cost) = update.cost_price {
            active.cost_price = Set(cost);
        }
        if let Some(supplier_id) = update.supplier_id {
            active.supplier_id = Set(Some(supplier_id));
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Soft deactivation. Parts with movement history are never hard-deleted;
    /// the schema enforces this with restrict-delete FKs.
    #[instrument(skip(self))]
    pub async fn deactivate_part(&self, part_id: Uuid) -> Result<part::Model, ServiceError> {
        let existing = self.get_part(part_id).await?;

        let mut active: part::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(part_id = %updated.id, "Part deactivated");
        Ok(updated)
    }

    pub async fn get_part(&self, part_id: Uuid) -> Result<part::Model, ServiceError> {
        part::Entity::find_by_id(part_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", part_id)))
    }
}

pub use sea_orm_migration::prelude::*;

mod m20250110_000001_create_suppliers_table;
mod m20250110_000002_create_parts_table;
mod m20250110_000003_create_stock_movements_table;
mod m20250110_000004_create_replenishment_orders_table;
mod m20250110_000005_create_replenishment_order_items_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250110_000001_create_suppliers_table::Migration),
            Box::new(m20250110_000002_create_parts_table::Migration),
            Box::new(m20250110_000003_create_stock_movements_table::Migration),
            Box::new(m20250110_000004_create_replenishment_orders_table::Migration),
            Box::new(m20250110_000005_create_replenishment_order_items_table::Migration),
        ]
    }
}

use sea_orm_migration::prelude::*;

use crate::m20250110_000001_create_suppliers_table::Suppliers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReplenishmentOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReplenishmentOrders::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::CustomerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::SupplierId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::OrderNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::Source)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::TrackingCode)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::ConfirmedAt)
                            .timestamp()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::ShippedAt)
                            .timestamp()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::ReceivedAt)
                            .timestamp()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::ReceivedBy)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::ReceivedNotes)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrders::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_replenishment_orders_supplier_id")
                            .from(
                                ReplenishmentOrders::Table,
                                ReplenishmentOrders::SupplierId,
                            )
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_replenishment_orders_customer_id_status")
                    .table(ReplenishmentOrders::Table)
                    .col(ReplenishmentOrders::CustomerId)
                    .col(ReplenishmentOrders::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReplenishmentOrders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ReplenishmentOrders {
    Table,
    Id,
    CustomerId,
    SupplierId,
    OrderNumber,
    Status,
    Source,
    TrackingCode,
    CreatedAt,
    ConfirmedAt,
    ShippedAt,
    ReceivedAt,
    ReceivedBy,
    ReceivedNotes,
    Version,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

use crate::m20250110_000002_create_parts_table::Parts;
use crate::m20250110_000004_create_replenishment_orders_table::ReplenishmentOrders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReplenishmentOrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::OrderId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::PartId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::QuantityRequested)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::QuantityConfirmed)
                            .decimal_len(19, 4)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::QuantityShipped)
                            .decimal_len(19, 4)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::QuantityReceived)
                            .decimal_len(19, 4)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReplenishmentOrderItems::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_replenishment_order_items_order_id")
                            .from(
                                ReplenishmentOrderItems::Table,
                                ReplenishmentOrderItems::OrderId,
                            )
                            .to(ReplenishmentOrders::Table, ReplenishmentOrders::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_replenishment_order_items_part_id")
                            .from(
                                ReplenishmentOrderItems::Table,
                                ReplenishmentOrderItems::PartId,
                            )
                            .to(Parts::Table, Parts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_replenishment_order_items_order_id")
                    .table(ReplenishmentOrderItems::Table)
                    .col(ReplenishmentOrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_replenishment_order_items_part_id")
                    .table(ReplenishmentOrderItems::Table)
                    .col(ReplenishmentOrderItems::PartId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ReplenishmentOrderItems::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum ReplenishmentOrderItems {
    Table,
    Id,
    OrderId,
    PartId,
    QuantityRequested,
    QuantityConfirmed,
    QuantityShipped,
    QuantityReceived,
    CreatedAt,
    UpdatedAt,
}

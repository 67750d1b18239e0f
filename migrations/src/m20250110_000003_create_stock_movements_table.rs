use sea_orm_migration::prelude::*;

use crate::m20250110_000002_create_parts_table::Parts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Audit rows are never deleted; the part FK is restrict-delete so a
        // part with history can only be soft-deactivated.
        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockMovements::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::PartId).uuid().not_null())
                    .col(
                        ColumnDef::new(StockMovements::MovementType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::Quantity)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::PreviousQuantity)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::NewQuantity)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::Reason).string().null())
                    .col(ColumnDef::new(StockMovements::Actor).string().not_null())
                    .col(
                        ColumnDef::new(StockMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movements_part_id")
                            .from(StockMovements::Table, StockMovements::PartId)
                            .to(Parts::Table, Parts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_movements_part_id_created_at")
                    .table(StockMovements::Table)
                    .col(StockMovements::PartId)
                    .col(StockMovements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StockMovements::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum StockMovements {
    Table,
    Id,
    PartId,
    MovementType,
    Quantity,
    PreviousQuantity,
    NewQuantity,
    Reason,
    Actor,
    CreatedAt,
}

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
                    .table(Parts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parts::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Parts::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Parts::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Parts::Module).string().not_null())
                    .col(ColumnDef::new(Parts::Name).string().not_null())
                    .col(ColumnDef::new(Parts::PartNumber).string().null())
                    .col(ColumnDef::new(Parts::Unit).string().not_null())
                    .col(
                        ColumnDef::new(Parts::CurrentQuantity)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parts::MinimumQuantity)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parts::MaximumQuantity)
                            .decimal_len(19, 4)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Parts::CostPrice)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Parts::SupplierId).uuid().null())
                    .col(
                        ColumnDef::new(Parts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Parts::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Parts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Parts::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parts_supplier_id")
                            .from(Parts::Table, Parts::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parts_customer_id")
                    .table(Parts::Table)
                    .col(Parts::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parts_supplier_id")
                    .table(Parts::Table)
                    .col(Parts::SupplierId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Parts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Parts {
    Table,
    Id,
    CustomerId,
    CompanyId,
    Module,
    Name,
    PartNumber,
    Unit,
    CurrentQuantity,
    MinimumQuantity,
    MaximumQuantity,
    CostPrice,
    SupplierId,
    IsActive,
    Version,
    CreatedAt,
    UpdatedAt,
}

//! Migration to create the teachers table.
//!
//! Teachers are keyed by a unique email and carry audit columns stamped by the
//! service on write.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teachers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Teachers::Email)
                            .string_len(320)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Teachers::FirstName).text().null())
                    .col(ColumnDef::new(Teachers::LastName).text().null())
                    .col(
                        ColumnDef::new(Teachers::Status)
                            .string_len(32)
                            .not_null()
                            .default("INACTIVE"),
                    )
                    .col(ColumnDef::new(Teachers::CreatedBy).text().null())
                    .col(
                        ColumnDef::new(Teachers::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Teachers::UpdatedBy).text().null())
                    .col(
                        ColumnDef::new(Teachers::UpdatedDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Teachers {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Status,
    CreatedBy,
    CreatedDate,
    UpdatedBy,
    UpdatedDate,
}

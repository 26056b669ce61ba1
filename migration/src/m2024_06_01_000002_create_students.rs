//! Migration to create the students table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Students::Email)
                            .string_len(320)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::FirstName).text().null())
                    .col(ColumnDef::new(Students::LastName).text().null())
                    .col(
                        ColumnDef::new(Students::Status)
                            .string_len(32)
                            .not_null()
                            .default("INACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Students::IsSuspended)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Students::CreatedBy).text().null())
                    .col(
                        ColumnDef::new(Students::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Students::UpdatedBy).text().null())
                    .col(
                        ColumnDef::new(Students::UpdatedDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Roster filters on suspension state
        manager
            .create_index(
                Index::create()
                    .name("idx_students_is_suspended")
                    .table(Students::Table)
                    .col(Students::IsSuspended)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_students_is_suspended").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Status,
    IsSuspended,
    CreatedBy,
    CreatedDate,
    UpdatedBy,
    UpdatedDate,
}

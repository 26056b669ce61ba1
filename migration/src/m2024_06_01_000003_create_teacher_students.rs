//! Migration to create the teacher_students link table.
//!
//! The composite primary key on (teacher_id, student_id) is the conflict
//! target of the registration upsert.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeacherStudents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeacherStudents::TeacherId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherStudents::StudentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherStudents::Status)
                            .string_len(32)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(ColumnDef::new(TeacherStudents::CreatedBy).text().null())
                    .col(
                        ColumnDef::new(TeacherStudents::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TeacherStudents::UpdatedBy).text().null())
                    .col(
                        ColumnDef::new(TeacherStudents::UpdatedDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_teacher_students")
                            .col(TeacherStudents::TeacherId)
                            .col(TeacherStudents::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teacher_students_teacher_id")
                            .from(TeacherStudents::Table, TeacherStudents::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teacher_students_student_id")
                            .from(TeacherStudents::Table, TeacherStudents::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Intersection queries group links by student
        manager
            .create_index(
                Index::create()
                    .name("idx_teacher_students_student_id")
                    .table(TeacherStudents::Table)
                    .col(TeacherStudents::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_teacher_students_student_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TeacherStudents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TeacherStudents {
    Table,
    TeacherId,
    StudentId,
    Status,
    CreatedBy,
    CreatedDate,
    UpdatedBy,
    UpdatedDate,
}

#[derive(DeriveIden)]
enum Teachers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}

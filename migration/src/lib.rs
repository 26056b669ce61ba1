//! Database migrations for the classroom service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_06_01_000001_create_teachers;
mod m2024_06_01_000002_create_students;
mod m2024_06_01_000003_create_teacher_students;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_06_01_000001_create_teachers::Migration),
            Box::new(m2024_06_01_000002_create_students::Migration),
            Box::new(m2024_06_01_000003_create_teacher_students::Migration),
        ]
    }
}

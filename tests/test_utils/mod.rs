//! Test utilities for database testing.
//!
//! Sets up in-memory SQLite databases with the migrations applied, plus
//! helpers for seeding and counting rows.

use std::path::Path;

use anyhow::Result;
use classroom::models::{Actor, Student, Teacher, TeacherStudent};
use classroom::services::ClassroomService;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait};

/// Audit principal used by every test.
#[allow(dead_code)]
pub const TEST_ACTOR: &str = "test-suite";

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// The pool holds a single connection so every query sees the same
/// in-memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Sets up a file-backed SQLite database under `dir` with a pool of
/// `connections`, so concurrent units of work really overlap.
#[allow(dead_code)]
pub async fn setup_file_db(dir: &Path, connections: u32) -> Result<DatabaseConnection> {
    let url = format!("sqlite://{}?mode=rwc", dir.join("classroom.db").display());
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(connections)
        .min_connections(connections)
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;

    Ok(db)
}

#[allow(dead_code)]
pub fn test_actor() -> Actor {
    Actor::new(TEST_ACTOR)
}

/// Database plus a service facade bound to it.
#[allow(dead_code)]
pub async fn setup_service() -> Result<(DatabaseConnection, ClassroomService)> {
    let db = setup_test_db().await?;
    let service = ClassroomService::new(db.clone(), test_actor());
    Ok((db, service))
}

/// Row counts of (teachers, students, links).
#[allow(dead_code)]
pub async fn row_counts<C: ConnectionTrait>(conn: &C) -> Result<(u64, u64, u64)> {
    Ok((
        Teacher::find().count(conn).await?,
        Student::find().count(conn).await?,
        TeacherStudent::find().count(conn).await?,
    ))
}

/// Makes every insert into `teacher_students` fail.
#[allow(dead_code)]
pub async fn install_link_fault(db: &DatabaseConnection) -> Result<()> {
    db.execute_unprepared(
        "CREATE TRIGGER fail_link_insert BEFORE INSERT ON teacher_students \
         BEGIN SELECT RAISE(ABORT, 'simulated link fault'); END;",
    )
    .await?;
    Ok(())
}

#[allow(dead_code)]
pub fn emails(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

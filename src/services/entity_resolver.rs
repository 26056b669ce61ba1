//! Get-or-create for teachers and students keyed by email.
//!
//! Resolution is lookup-then-insert. Two first-time creations of the same
//! email racing each other make one insert fail on the unique key; that
//! failure surfaces as [`ServiceError::Conflict`] and is never retried here.

use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{debug, instrument};

use crate::error::ServiceError;
use crate::models::{Actor, EntityKind, Person, student, teacher};
use crate::repositories::{StudentRepository, TeacherRepository};

use super::unit_of_work::{TxScope, UnitOfWork};

/// An entity together with whether this call inserted it.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub entity: T,
    pub created: bool,
}

/// Entry point for entity resolution on a pool.
pub struct EntityResolver<'a> {
    db: &'a DatabaseConnection,
    actor: &'a Actor,
}

impl<'a> EntityResolver<'a> {
    pub fn new(db: &'a DatabaseConnection, actor: &'a Actor) -> Self {
        Self { db, actor }
    }

    /// Returns the entity of `kind` keyed by `email`, creating it with
    /// default attributes when absent.
    #[instrument(skip(self, scope), fields(kind = %kind))]
    pub async fn get_or_create(
        &self,
        kind: EntityKind,
        email: &str,
        scope: TxScope<'_>,
    ) -> Result<Person, ServiceError> {
        let uow = UnitOfWork::enter(self.db, scope).await?;
        let outcome = get_or_create_in(uow.conn(), kind, email, self.actor).await;
        uow.finish(outcome).await.map(|resolved| resolved.entity)
    }

    /// Pure lookup; absence is `Ok(None)`.
    pub async fn get_by_email(
        &self,
        kind: EntityKind,
        email: &str,
    ) -> Result<Option<Person>, ServiceError> {
        find_in(self.db, kind, email).await
    }
}

/// Lookup by email on `conn`.
pub async fn find_in<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    email: &str,
) -> Result<Option<Person>, ServiceError> {
    let found = match kind {
        EntityKind::Teacher => TeacherRepository::new(conn)
            .find_by_email(email)
            .await?
            .map(Person::Teacher),
        EntityKind::Student => StudentRepository::new(conn)
            .find_by_email(email)
            .await?
            .map(Person::Student),
    };
    Ok(found)
}

/// Get-or-create on `conn`, which is expected to be a unit of work's
/// transaction.
pub async fn get_or_create_in<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    email: &str,
    actor: &Actor,
) -> Result<Resolved<Person>, ServiceError> {
    let resolved = match kind {
        EntityKind::Teacher => {
            let Resolved { entity, created } = resolve_teacher(conn, email, actor).await?;
            Resolved {
                entity: Person::Teacher(entity),
                created,
            }
        }
        EntityKind::Student => {
            let Resolved { entity, created } = resolve_student(conn, email, actor).await?;
            Resolved {
                entity: Person::Student(entity),
                created,
            }
        }
    };
    Ok(resolved)
}

/// Get-or-create a teacher on `conn`.
pub async fn resolve_teacher<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    actor: &Actor,
) -> Result<Resolved<teacher::Model>, ServiceError> {
    require_email(EntityKind::Teacher, email)?;
    let repo = TeacherRepository::new(conn);

    if let Some(existing) = repo.find_by_email(email).await? {
        return Ok(Resolved {
            entity: existing,
            created: false,
        });
    }

    let id = repo.insert(email, actor).await?;
    debug!(id, "teacher created");

    // Re-read so the caller sees the canonical persisted row.
    let entity = repo
        .find_by_email(email)
        .await?
        .ok_or_else(|| not_found(EntityKind::Teacher, email))?;
    Ok(Resolved {
        entity,
        created: true,
    })
}

/// Get-or-create a student on `conn`.
pub async fn resolve_student<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    actor: &Actor,
) -> Result<Resolved<student::Model>, ServiceError> {
    require_email(EntityKind::Student, email)?;
    let repo = StudentRepository::new(conn);

    if let Some(existing) = repo.find_by_email(email).await? {
        return Ok(Resolved {
            entity: existing,
            created: false,
        });
    }

    let id = repo.insert(email, actor).await?;
    debug!(id, "student created");

    let entity = repo
        .find_by_email(email)
        .await?
        .ok_or_else(|| not_found(EntityKind::Student, email))?;
    Ok(Resolved {
        entity,
        created: true,
    })
}

fn require_email(kind: EntityKind, email: &str) -> Result<(), ServiceError> {
    if email.trim().is_empty() {
        return Err(ServiceError::invalid(format!("{kind} email is required")));
    }
    Ok(())
}

fn not_found(kind: EntityKind, email: &str) -> ServiceError {
    ServiceError::NotFound {
        kind: kind.as_str(),
        key: email.to_string(),
    }
}

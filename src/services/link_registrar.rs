//! Atomic registration of students under a teacher.

use std::collections::HashSet;

use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::models::Actor;
use crate::repositories::TeacherStudentRepository;

use super::entity_resolver::{resolve_student, resolve_teacher};
use super::unit_of_work::{TxScope, UnitOfWork};

/// Outcome of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Link rows inserted or re-activated by the upsert.
    pub registered_count: u64,
}

pub struct LinkRegistrar<'a> {
    db: &'a DatabaseConnection,
    actor: &'a Actor,
}

impl<'a> LinkRegistrar<'a> {
    pub fn new(db: &'a DatabaseConnection, actor: &'a Actor) -> Self {
        Self { db, actor }
    }

    /// Resolves the teacher and every student, then upserts all links in one
    /// statement. Nothing from a failed call stays visible once its owning
    /// unit of work has rolled back.
    #[instrument(skip(self, student_emails, scope), fields(students = student_emails.len()))]
    pub async fn register_links(
        &self,
        teacher_email: &str,
        student_emails: &[String],
        scope: TxScope<'_>,
    ) -> Result<Registration, ServiceError> {
        let uow = UnitOfWork::enter(self.db, scope).await?;
        let outcome = register_links_in(uow.conn(), teacher_email, student_emails, self.actor).await;
        let registration = uow.finish(outcome).await?;

        counter!("classroom_links_registered_total").increment(registration.registered_count);
        info!(
            registered = registration.registered_count,
            "students registered"
        );
        Ok(registration)
    }
}

/// Registration on `conn`. Errors raised after the first write are wrapped
/// in [`ServiceError::PartialWrite`].
pub async fn register_links_in<C: ConnectionTrait>(
    conn: &C,
    teacher_email: &str,
    student_emails: &[String],
    actor: &Actor,
) -> Result<Registration, ServiceError> {
    let teacher = resolve_teacher(conn, teacher_email, actor).await?;
    let mut wrote = teacher.created;

    // Input duplicates are each resolved; only the first resolution can insert.
    let mut student_ids = Vec::with_capacity(student_emails.len());
    for email in student_emails {
        match resolve_student(conn, email, actor).await {
            Ok(student) => {
                wrote |= student.created;
                student_ids.push(student.entity.id);
            }
            Err(err) if wrote => return Err(ServiceError::partial("student resolution", err)),
            Err(err) => return Err(err),
        }
    }

    let mut seen = HashSet::with_capacity(student_ids.len());
    let pairs: Vec<(i32, i32)> = student_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .map(|student_id| (teacher.entity.id, student_id))
        .collect();

    let registered_count = match TeacherStudentRepository::new(conn)
        .upsert_active(&pairs, actor)
        .await
    {
        Ok(count) => count,
        Err(err) if wrote => return Err(ServiceError::partial("link upsert", err.into())),
        Err(err) => return Err(err.into()),
    };

    Ok(Registration { registered_count })
}

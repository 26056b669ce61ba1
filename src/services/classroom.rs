//! Classroom operations exposed to the HTTP layer.

use metrics::counter;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::models::Actor;
use crate::repositories::StudentRepository;

use super::entity_resolver::resolve_student;
use super::link_registrar::{LinkRegistrar, Registration};
use super::recipients::RecipientResolver;
use super::roster::RosterQuery;
use super::unit_of_work::{TxScope, UnitOfWork};

/// Facade over the registration, roster and notification services.
#[derive(Clone, Debug)]
pub struct ClassroomService {
    db: DatabaseConnection,
    actor: Actor,
}

impl ClassroomService {
    pub fn new(db: DatabaseConnection, actor: Actor) -> Self {
        Self { db, actor }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Registers every student under the teacher, creating missing entities.
    pub async fn register_students(
        &self,
        teacher_email: &str,
        student_emails: &[String],
    ) -> Result<Registration, ServiceError> {
        require("teacher", teacher_email)?;
        if student_emails.is_empty() {
            return Err(ServiceError::invalid("at least one student email is required"));
        }
        for email in student_emails {
            require("student", email)?;
        }

        LinkRegistrar::new(&self.db, &self.actor)
            .register_links(teacher_email, student_emails, TxScope::Own)
            .await
    }

    /// Emails of the students registered to all of the given teachers.
    pub async fn common_students(
        &self,
        teacher_emails: &[String],
    ) -> Result<Vec<String>, ServiceError> {
        let students = RosterQuery::new(&self.db)
            .common_to_teachers(teacher_emails)
            .await?;
        Ok(students.into_iter().map(|s| s.email).collect())
    }

    /// Marks the student as suspended, creating it first when unknown.
    #[instrument(skip(self))]
    pub async fn suspend_student(&self, student_email: &str) -> Result<(), ServiceError> {
        require("student", student_email)?;

        let uow = UnitOfWork::begin(&self.db).await?;
        let outcome: Result<i32, ServiceError> = async {
            let student = resolve_student(uow.conn(), student_email, &self.actor).await?;
            let written = StudentRepository::new(uow.conn())
                .set_suspended(student.entity.id, true, &self.actor)
                .await;
            match written {
                Ok(_) => Ok(student.entity.id),
                Err(err) if student.created => {
                    Err(ServiceError::partial("suspension update", err.into()))
                }
                Err(err) => Err(err.into()),
            }
        }
        .await;
        let student_id = uow.finish(outcome).await?;

        counter!("classroom_students_suspended_total").increment(1);
        info!(student_id, "student suspended");
        Ok(())
    }

    /// Recipients of a notification sent by the teacher.
    pub async fn resolve_recipients(
        &self,
        teacher_email: &str,
        notification: Option<&str>,
    ) -> Result<Vec<String>, ServiceError> {
        require("teacher", teacher_email)?;
        RecipientResolver::new(&self.db)
            .resolve_recipients(teacher_email, notification)
            .await
    }

    /// Emails on the teacher's roster, optionally filtered by suspension.
    pub async fn roster_of(
        &self,
        teacher_email: &str,
        suspended: Option<bool>,
    ) -> Result<Vec<String>, ServiceError> {
        require("teacher", teacher_email)?;
        let students = RosterQuery::new(&self.db)
            .roster_of(teacher_email, suspended)
            .await?;
        Ok(students.into_iter().map(|s| s.email).collect())
    }
}

fn require(field: &str, email: &str) -> Result<(), ServiceError> {
    if email.trim().is_empty() {
        return Err(ServiceError::invalid(format!("{field} email is required")));
    }
    Ok(())
}

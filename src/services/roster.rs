//! Read-only roster queries.

use sea_orm::ConnectionTrait;
use tracing::instrument;

use crate::error::ServiceError;
use crate::models::student;
use crate::repositories::{StudentRepository, TeacherRepository};

use super::mentions::dedup_preserving_order;

/// Roster queries over any connection.
pub struct RosterQuery<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RosterQuery<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Students actively linked to the teacher, optionally filtered by
    /// suspension. An unknown or blank teacher has an empty roster.
    #[instrument(skip(self))]
    pub async fn roster_of(
        &self,
        teacher_email: &str,
        suspended: Option<bool>,
    ) -> Result<Vec<student::Model>, ServiceError> {
        if teacher_email.trim().is_empty() {
            return Ok(Vec::new());
        }

        let Some(teacher) = TeacherRepository::new(self.conn)
            .find_by_email(teacher_email)
            .await?
        else {
            return Ok(Vec::new());
        };

        Ok(StudentRepository::new(self.conn)
            .roster_of(teacher.id, suspended)
            .await?)
    }

    /// Students actively linked to every listed teacher.
    ///
    /// Repeated and blank emails are ignored. When any remaining email names
    /// no teacher the intersection is empty.
    #[instrument(skip(self, teacher_emails), fields(teachers = teacher_emails.len()))]
    pub async fn common_to_teachers(
        &self,
        teacher_emails: &[String],
    ) -> Result<Vec<student::Model>, ServiceError> {
        let mut distinct: Vec<String> = teacher_emails
            .iter()
            .map(|email| email.trim())
            .filter(|email| !email.is_empty())
            .map(str::to_string)
            .collect();
        dedup_preserving_order(&mut distinct);

        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let teachers = TeacherRepository::new(self.conn)
            .find_by_emails(&distinct)
            .await?;
        if teachers.len() != distinct.len() {
            return Ok(Vec::new());
        }

        let teacher_ids: Vec<i32> = teachers.iter().map(|t| t.id).collect();
        Ok(StudentRepository::new(self.conn)
            .linked_to_all(&teacher_ids)
            .await?)
    }

    /// Existing students among `emails`, optionally filtered by suspension.
    pub async fn by_emails(
        &self,
        emails: &[String],
        suspended: Option<bool>,
    ) -> Result<Vec<student::Model>, ServiceError> {
        Ok(StudentRepository::new(self.conn)
            .find_by_emails(emails, suspended)
            .await?)
    }
}

//! # Teacher Repository
//!
//! Row-level access to the `teachers` table over any connection, so the same
//! queries run against the pool or inside an open transaction.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::models::teacher::{
    ActiveModel as TeacherActiveModel, Column as TeacherColumn, Entity as Teacher,
    Model as TeacherModel,
};
use crate::models::{Actor, STATUS_INACTIVE};

/// Repository for teacher database operations
pub struct TeacherRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TeacherRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Get teacher by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<TeacherModel>, DbErr> {
        Teacher::find()
            .filter(TeacherColumn::Email.eq(email))
            .one(self.conn)
            .await
    }

    /// Teachers whose email is in `emails`, ordered by id
    pub async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<TeacherModel>, DbErr> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        Teacher::find()
            .filter(TeacherColumn::Email.is_in(emails.iter().map(String::as_str)))
            .order_by_asc(TeacherColumn::Id)
            .all(self.conn)
            .await
    }

    /// Insert a teacher with default attributes, returning the generated id.
    ///
    /// Fails with a unique violation if the email already exists.
    pub async fn insert(&self, email: &str, actor: &Actor) -> Result<i32, DbErr> {
        let teacher = TeacherActiveModel {
            email: Set(email.to_string()),
            first_name: Set(None),
            last_name: Set(None),
            status: Set(STATUS_INACTIVE.to_string()),
            created_by: Set(Some(actor.to_string())),
            created_date: Set(Utc::now().into()),
            updated_by: Set(None),
            updated_date: Set(None),
            ..Default::default()
        };

        let result = Teacher::insert(teacher).exec(self.conn).await?;
        Ok(result.last_insert_id)
    }
}

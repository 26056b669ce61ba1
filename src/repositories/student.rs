//! # Student Repository
//!
//! Row-level access to the `students` table, including the roster and
//! intersection queries that join through `teacher_students`.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait, Select, Set,
    sea_query::Expr,
};

use crate::models::student::{
    ActiveModel as StudentActiveModel, Column as StudentColumn, Entity as Student,
    Model as StudentModel,
};
use crate::models::teacher_student::{Column as LinkColumn, Entity as TeacherStudent};
use crate::models::{Actor, STATUS_ACTIVE, STATUS_INACTIVE};

/// Repository for student database operations
pub struct StudentRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> StudentRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Get student by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<StudentModel>, DbErr> {
        Student::find()
            .filter(StudentColumn::Email.eq(email))
            .one(self.conn)
            .await
    }

    /// Students whose email is in `emails`, optionally filtered by suspension,
    /// ordered by id.
    pub async fn find_by_emails(
        &self,
        emails: &[String],
        suspended: Option<bool>,
    ) -> Result<Vec<StudentModel>, DbErr> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let query = Student::find()
            .filter(StudentColumn::Email.is_in(emails.iter().map(String::as_str)));
        with_suspension(query, suspended)
            .order_by_asc(StudentColumn::Id)
            .all(self.conn)
            .await
    }

    /// Insert a student with default attributes, returning the generated id.
    ///
    /// Fails with a unique violation if the email already exists.
    pub async fn insert(&self, email: &str, actor: &Actor) -> Result<i32, DbErr> {
        let student = StudentActiveModel {
            email: Set(email.to_string()),
            first_name: Set(None),
            last_name: Set(None),
            status: Set(STATUS_INACTIVE.to_string()),
            is_suspended: Set(false),
            created_by: Set(Some(actor.to_string())),
            created_date: Set(Utc::now().into()),
            updated_by: Set(None),
            updated_date: Set(None),
            ..Default::default()
        };

        let result = Student::insert(student).exec(self.conn).await?;
        Ok(result.last_insert_id)
    }

    /// Set the suspension flag of one student, stamping the update audit
    /// columns. Returns the number of rows written.
    pub async fn set_suspended(
        &self,
        student_id: i32,
        suspended: bool,
        actor: &Actor,
    ) -> Result<u64, DbErr> {
        let result = Student::update_many()
            .col_expr(StudentColumn::IsSuspended, Expr::value(suspended))
            .col_expr(StudentColumn::UpdatedBy, Expr::value(actor.to_string()))
            .col_expr(
                StudentColumn::UpdatedDate,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(StudentColumn::Id.eq(student_id))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Students with an active link to `teacher_id`, optionally filtered by
    /// suspension, ordered by id.
    pub async fn roster_of(
        &self,
        teacher_id: i32,
        suspended: Option<bool>,
    ) -> Result<Vec<StudentModel>, DbErr> {
        let linked = TeacherStudent::find()
            .select_only()
            .column(LinkColumn::StudentId)
            .filter(LinkColumn::TeacherId.eq(teacher_id))
            .filter(LinkColumn::Status.eq(STATUS_ACTIVE))
            .into_query();

        let query = Student::find().filter(StudentColumn::Id.in_subquery(linked));
        with_suspension(query, suspended)
            .order_by_asc(StudentColumn::Id)
            .all(self.conn)
            .await
    }

    /// Students with an active link to every teacher in `teacher_ids`,
    /// ordered by id.
    ///
    /// `teacher_ids` must be distinct: a student qualifies when its number of
    /// matching links equals their count, and the composite key allows one
    /// link per pair.
    pub async fn linked_to_all(&self, teacher_ids: &[i32]) -> Result<Vec<StudentModel>, DbErr> {
        if teacher_ids.is_empty() {
            return Ok(Vec::new());
        }

        let required = teacher_ids.len() as i64;
        let common = TeacherStudent::find()
            .select_only()
            .column(LinkColumn::StudentId)
            .filter(LinkColumn::TeacherId.is_in(teacher_ids.iter().copied()))
            .filter(LinkColumn::Status.eq(STATUS_ACTIVE))
            .group_by(LinkColumn::StudentId)
            .having(Expr::expr(Expr::col(LinkColumn::TeacherId).count()).eq(required))
            .into_query();

        Student::find()
            .filter(StudentColumn::Id.in_subquery(common))
            .order_by_asc(StudentColumn::Id)
            .all(self.conn)
            .await
    }
}

fn with_suspension(query: Select<Student>, suspended: Option<bool>) -> Select<Student> {
    match suspended {
        Some(flag) => query.filter(StudentColumn::IsSuspended.eq(flag)),
        None => query,
    }
}

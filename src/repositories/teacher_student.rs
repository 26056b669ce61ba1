//! # Teacher-Student Link Repository
//!
//! Batch upsert of links keyed by `(teacher_id, student_id)`.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
    sea_query::OnConflict,
};

use crate::models::teacher_student::{
    ActiveModel as LinkActiveModel, Column as LinkColumn, Entity as TeacherStudent,
};
use crate::models::{Actor, STATUS_ACTIVE};

/// Repository for teacher-student link operations
pub struct TeacherStudentRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TeacherStudentRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert one `ACTIVE` link per pair in a single statement. Pairs that
    /// already exist are switched back to `ACTIVE` and get fresh update audit
    /// columns instead.
    ///
    /// Returns the number of rows inserted or updated. `pairs` must not
    /// repeat a pair.
    pub async fn upsert_active(
        &self,
        pairs: &[(i32, i32)],
        actor: &Actor,
    ) -> Result<u64, DbErr> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let links = pairs.iter().map(|&(teacher_id, student_id)| LinkActiveModel {
            teacher_id: Set(teacher_id),
            student_id: Set(student_id),
            status: Set(STATUS_ACTIVE.to_string()),
            created_by: Set(Some(actor.to_string())),
            created_date: Set(now),
            updated_by: Set(None),
            updated_date: Set(None),
        });

        TeacherStudent::insert_many(links)
            .on_conflict(
                OnConflict::columns([LinkColumn::TeacherId, LinkColumn::StudentId])
                    .value(LinkColumn::Status, STATUS_ACTIVE)
                    .value(LinkColumn::UpdatedBy, actor.to_string())
                    .value(LinkColumn::UpdatedDate, now)
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
    }

    /// Number of link rows for `teacher_id`, whatever their status.
    pub async fn count_for_teacher(&self, teacher_id: i32) -> Result<u64, DbErr> {
        TeacherStudent::find()
            .filter(LinkColumn::TeacherId.eq(teacher_id))
            .count(self.conn)
            .await
    }
}

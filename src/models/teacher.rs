//! Teacher entity model
//!
//! SeaORM entity for the `teachers` table. Teachers are keyed by a unique
//! email and are created lazily the first time a registration names them.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Teacher row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    /// Surrogate identifier assigned by storage
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Natural key, unique and case-sensitive as stored
    #[sea_orm(unique)]
    pub email: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// Lifecycle tag, `INACTIVE` at creation
    pub status: String,

    pub created_by: Option<String>,
    pub created_date: DateTimeWithTimeZone,
    pub updated_by: Option<String>,
    pub updated_date: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::teacher_student::Entity")]
    TeacherStudent,
}

impl Related<super::teacher_student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeacherStudent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

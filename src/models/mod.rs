//! # Data Models
//!
//! SeaORM entities for teachers, students and their links, plus the small
//! value types shared by the services.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod student;
pub mod teacher;
pub mod teacher_student;

pub use student::Entity as Student;
pub use teacher::Entity as Teacher;
pub use teacher_student::Entity as TeacherStudent;

/// Lifecycle status of a link that counts towards rosters.
pub const STATUS_ACTIVE: &str = "ACTIVE";
/// Lifecycle status given to newly created teachers and students.
pub const STATUS_INACTIVE: &str = "INACTIVE";

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "classroom".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The two entity kinds keyed by email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Teacher,
    Student,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Teacher => "teacher",
            EntityKind::Student => "student",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved teacher or student row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Person {
    Teacher(teacher::Model),
    Student(student::Model),
}

impl Person {
    pub fn kind(&self) -> EntityKind {
        match self {
            Person::Teacher(_) => EntityKind::Teacher,
            Person::Student(_) => EntityKind::Student,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Person::Teacher(t) => t.id,
            Person::Student(s) => s.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Person::Teacher(t) => &t.email,
            Person::Student(s) => &s.email,
        }
    }
}

/// Principal recorded in the `created_by` / `updated_by` audit columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor(String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! # Repository Layer
//!
//! Repositories wrap SeaORM queries for teachers, students and their links.
//! Each borrows any [`sea_orm::ConnectionTrait`], so callers decide whether a
//! query runs on the pool or inside a unit of work.

pub mod student;
pub mod teacher;
pub mod teacher_student;

pub use student::StudentRepository;
pub use teacher::TeacherRepository;
pub use teacher_student::TeacherStudentRepository;

//! # Classroom Library
//!
//! Teacher and student registration, roster queries and notification
//! recipient resolution, served over HTTP.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod services;
pub mod telemetry;
pub use migration;

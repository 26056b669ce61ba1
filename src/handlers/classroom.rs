//! # Classroom API Handlers
//!
//! Registration, suspension, common-student and notification endpoints.

use axum::{
    extract::{
        Query, RawQuery, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, validation_error};
use crate::server::AppState;

/// Request payload for registering students under a teacher
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    #[schema(example = "teacherken@gmail.com")]
    pub teacher: String,
    #[schema(example = json!(["studentjon@gmail.com", "studenthon@gmail.com"]))]
    pub students: Vec<String>,
}

/// Request payload for suspending a student
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SuspendRequest {
    #[schema(example = "studentmary@gmail.com")]
    pub student: String,
}

/// Request payload for resolving notification recipients
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NotificationRequest {
    #[schema(example = "teacherken@gmail.com")]
    pub teacher: String,
    /// Free text; `@email` mentions add recipients
    #[schema(example = "Hello students! @studentagnes@gmail.com")]
    pub notification: Option<String>,
}

/// Student list response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentsResponse {
    pub students: Vec<String>,
}

/// Notification recipients response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipientsResponse {
    pub recipients: Vec<String>,
}

/// Roster query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RosterParams {
    /// Teacher email
    pub teacher: String,
    /// Only students with this suspension state
    pub suspended: Option<bool>,
}

/// Register students under a teacher
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 204, description = "Students registered"),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Concurrent creation of the same email; retry", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "classroom"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;

    if request.teacher.trim().is_empty() {
        return Err(field_error("teacher", "teacher email is required"));
    }
    if request.students.is_empty() {
        return Err(field_error("students", "at least one student email is required"));
    }
    if request.students.iter().any(|s| s.trim().is_empty()) {
        return Err(field_error("students", "student emails cannot be blank"));
    }

    state
        .classroom
        .register_students(&request.teacher, &request.students)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Students registered to all of the given teachers
#[utoipa::path(
    get,
    path = "/api/commonstudents",
    params(
        ("teacher" = Vec<String>, Query, description = "Teacher email; repeat the parameter or comma-separate values")
    ),
    responses(
        (status = 200, description = "Common students", body = StudentsResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "classroom"
)]
pub async fn common_students(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<StudentsResponse>, ApiError> {
    let teachers = teacher_params(query.as_deref().unwrap_or_default());
    if teachers.is_empty() {
        return Err(field_error("teacher", "at least one teacher email is required"));
    }

    let students = state.classroom.common_students(&teachers).await?;
    Ok(Json(StudentsResponse { students }))
}

/// Suspend a student
#[utoipa::path(
    post,
    path = "/api/suspend",
    request_body = SuspendRequest,
    responses(
        (status = 204, description = "Student suspended"),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Concurrent creation of the same email; retry", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "classroom"
)]
pub async fn suspend(
    State(state): State<AppState>,
    payload: Result<Json<SuspendRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;

    if request.student.trim().is_empty() {
        return Err(field_error("student", "student email is required"));
    }

    state.classroom.suspend_student(&request.student).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recipients of a teacher's notification
#[utoipa::path(
    post,
    path = "/api/retrievefornotifications",
    request_body = NotificationRequest,
    responses(
        (status = 200, description = "Notification recipients", body = RecipientsResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "classroom"
)]
pub async fn retrieve_for_notifications(
    State(state): State<AppState>,
    payload: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<Json<RecipientsResponse>, ApiError> {
    let Json(request) = payload?;

    if request.teacher.trim().is_empty() {
        return Err(field_error("teacher", "teacher email is required"));
    }

    let recipients = state
        .classroom
        .resolve_recipients(&request.teacher, request.notification.as_deref())
        .await?;
    Ok(Json(RecipientsResponse { recipients }))
}

/// Roster of a teacher
#[utoipa::path(
    get,
    path = "/api/students",
    params(RosterParams),
    responses(
        (status = 200, description = "Students registered to the teacher", body = StudentsResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "classroom"
)]
pub async fn roster(
    State(state): State<AppState>,
    params: Result<Query<RosterParams>, QueryRejection>,
) -> Result<Json<StudentsResponse>, ApiError> {
    let Query(params) = params?;

    if params.teacher.trim().is_empty() {
        return Err(field_error("teacher", "teacher email is required"));
    }

    let students = state
        .classroom
        .roster_of(&params.teacher, params.suspended)
        .await?;
    Ok(Json(StudentsResponse { students }))
}

/// Every `teacher` value in a query string, splitting comma-delimited values.
fn teacher_params(query: &str) -> Vec<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "teacher")
        .flat_map(|(_, value)| {
            value
                .split(',')
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn field_error(field: &str, message: &str) -> ApiError {
    validation_error(
        message,
        serde_json::json!({ "field": field, "message": message }),
    )
}

use axum::extract::State;
use serde::Deserialize;

use super::envelope::{ApiPath, ApiQuery, ApiResponse, Created, Empty, Paginated, ValidatedJson, deleted};
use crate::auth::{Claims, Policy};
use crate::domain::{DomainError, PageQuery};
use crate::infrastructure::AppState;
use crate::models::enums::StudentStatus;
use crate::models::student::{CreateStudentRequest, StudentDto, UpdateStudentRequest};
use crate::services::student_service::{self, StudentFilter};

#[derive(Debug, Deserialize)]
pub struct StudentsQuery {
    pub status: Option<StudentStatus>,
}

pub async fn list_students(
    State(state): State<AppState>,
    claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
    ApiQuery(params): ApiQuery<StudentsQuery>,
) -> Result<Paginated<StudentDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let filter = StudentFilter {
        status: params.status,
    };
    let page =
        student_service::list_students(state.db(), filter, visibility, query.to_request()?).await?;
    Ok(page.into())
}

pub async fn get_student(
    State(state): State<AppState>,
    _claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<StudentDto>, DomainError> {
    Ok(ApiResponse::ok(
        student_service::get_student(state.db(), id).await?,
    ))
}

pub async fn get_student_by_code(
    State(state): State<AppState>,
    _claims: Claims,
    ApiPath(code): ApiPath<String>,
) -> Result<ApiResponse<StudentDto>, DomainError> {
    Ok(ApiResponse::ok(
        student_service::get_student_by_code(state.db(), &code).await?,
    ))
}

pub async fn create_student(
    State(state): State<AppState>,
    claims: Claims,
    ValidatedJson(payload): ValidatedJson<CreateStudentRequest>,
) -> Result<Created<StudentDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let student = student_service::create_student(state.db(), payload).await?;
    Ok(Created(student, "Student created successfully"))
}

pub async fn update_student(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateStudentRequest>,
) -> Result<ApiResponse<StudentDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let student = student_service::update_student(state.db(), id, payload).await?;
    Ok(ApiResponse::with_message(
        student,
        "Student updated successfully",
    ))
}

pub async fn delete_student(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Empty>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    student_service::delete_student(state.db(), id).await?;
    Ok(deleted("Student"))
}

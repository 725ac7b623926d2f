use chrono::Utc;
use sea_orm::*;

use super::listing::{fetch_page, find_live};
use crate::domain::{DomainError, Page, PageRequest};
use crate::models::enums::{ContractStatus, StudentStatus};
use crate::models::student::{
    self, CreateStudentRequest, Entity as Student, StudentDto, UpdateStudentRequest,
};
use crate::models::{Visibility, contract, contract_student, scoped};

#[derive(Debug, Default, Clone)]
pub struct StudentFilter {
    pub status: Option<StudentStatus>,
}

pub async fn list_students(
    db: &DatabaseConnection,
    filter: StudentFilter,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<StudentDto>, DomainError> {
    let mut select = scoped::<Student>(visibility);
    if let Some(status) = filter.status {
        select = select.filter(student::Column::Status.eq(status));
    }
    let select = select.order_by_asc(student::Column::Id);
    Ok(fetch_page(db, select, page).await?.map(StudentDto::from))
}

pub async fn get_student(db: &DatabaseConnection, id: i32) -> Result<StudentDto, DomainError> {
    Ok(find_live::<Student, _>(db, id, "Student").await?.into())
}

pub async fn get_student_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<StudentDto, DomainError> {
    Student::find()
        .filter(student::Column::StudentCode.eq(code))
        .filter(student::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .map(StudentDto::from)
        .ok_or_else(|| DomainError::not_found("Student"))
}

async fn ensure_email_free(
    db: &DatabaseConnection,
    email: &str,
    except: Option<i32>,
) -> Result<(), DomainError> {
    let mut query = Student::find().filter(student::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(student::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(DomainError::Conflict("Email already exists".into()));
    }
    Ok(())
}

pub async fn create_student(
    db: &DatabaseConnection,
    request: CreateStudentRequest,
) -> Result<StudentDto, DomainError> {
    let code_taken = Student::find()
        .filter(student::Column::StudentCode.eq(request.student_code.as_str()))
        .count(db)
        .await?
        > 0;
    if code_taken {
        return Err(DomainError::Conflict("Student code already exists".into()));
    }
    ensure_email_free(db, &request.email, None).await?;

    let created = request.into_active_model(Utc::now()).insert(db).await?;
    tracing::info!("Student {} registered ({})", created.id, created.student_code);
    Ok(created.into())
}

pub async fn update_student(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateStudentRequest,
) -> Result<StudentDto, DomainError> {
    let existing = find_live::<Student, _>(db, id, "Student").await?;
    if let Some(email) = request.email.as_deref() {
        if email != existing.email {
            ensure_email_free(db, email, Some(id)).await?;
        }
    }

    let mut active: student::ActiveModel = existing.into();
    request.apply(&mut active, Utc::now());
    Ok(active.update(db).await?.into())
}

/// A student who co-signs an active contract stays.
pub async fn delete_student(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;
    let existing = find_live::<Student, _>(&txn, id, "Student").await?;

    let active_contracts = contract::Entity::find()
        .inner_join(contract_student::Entity)
        .filter(contract_student::Column::StudentId.eq(id))
        .filter(contract::Column::Status.eq(ContractStatus::Active))
        .filter(contract::Column::IsDeleted.eq(false))
        .count(&txn)
        .await?;
    if active_contracts > 0 {
        tracing::warn!("Refusing to delete student {}: active contract", id);
        return Err(DomainError::Conflict(
            "Student has an active contract".into(),
        ));
    }

    let mut active: student::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.deleted_at = Set(Some(Utc::now()));
    active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!("Student {} deleted", id);
    Ok(())
}

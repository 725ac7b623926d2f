//! Contract Service - leases and the room occupancy they drive
//!
//! Every operation that touches both a contract and its room runs inside one
//! transaction. Rooms are claimed with a conditional update
//! (`Available -> Occupied`) so two concurrent leases cannot both succeed.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;

use super::listing::{fetch_page, find_live};
use crate::domain::lifecycle::{Transition, can_lease, plan_transition, status_after_release};
use crate::domain::{DomainError, FieldErrors, Page, PageRequest};
use crate::models::contract::{
    self, ContractDto, ContractStudentDto, CreateContractRequest, Entity as Contract,
    UpdateContractRequest,
};
use crate::models::enums::{ContractStatus, InvoiceStatus, RoomStatus};
use crate::models::{Visibility, contract_student, invoice, room, scoped, student};

/// Filter parameters for listing contracts
#[derive(Debug, Default, Clone)]
pub struct ContractFilter {
    pub status: Option<ContractStatus>,
    pub room_id: Option<i32>,
    pub student_id: Option<i32>,
}

pub async fn list_contracts(
    db: &DatabaseConnection,
    filter: ContractFilter,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<ContractDto>, DomainError> {
    let mut select = scoped::<Contract>(visibility);
    if let Some(status) = filter.status {
        select = select.filter(contract::Column::Status.eq(status));
    }
    if let Some(room_id) = filter.room_id {
        select = select.filter(contract::Column::RoomId.eq(room_id));
    }
    if let Some(student_id) = filter.student_id {
        select = select
            .inner_join(contract_student::Entity)
            .filter(contract_student::Column::StudentId.eq(student_id));
    }
    let select = select.order_by_asc(contract::Column::Id);

    let page = fetch_page(db, select, page).await?;
    let items = assemble(db, page.items).await?;
    Ok(Page {
        items,
        meta: page.meta,
    })
}

pub async fn list_contracts_by_student(
    db: &DatabaseConnection,
    student_id: i32,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<ContractDto>, DomainError> {
    find_live::<student::Entity, _>(db, student_id, "Student").await?;
    let filter = ContractFilter {
        student_id: Some(student_id),
        ..Default::default()
    };
    list_contracts(db, filter, visibility, page).await
}

/// Active contracts of a room (at most one while the room invariant holds).
pub async fn list_active_contracts_by_room(
    db: &DatabaseConnection,
    room_id: i32,
    page: PageRequest,
) -> Result<Page<ContractDto>, DomainError> {
    find_live::<room::Entity, _>(db, room_id, "Room").await?;
    let filter = ContractFilter {
        status: Some(ContractStatus::Active),
        room_id: Some(room_id),
        ..Default::default()
    };
    list_contracts(db, filter, Visibility::Live, page).await
}

pub async fn get_contract(db: &DatabaseConnection, id: i32) -> Result<ContractDto, DomainError> {
    let model = find_live::<Contract, _>(db, id, "Contract").await?;
    assemble_one(db, model).await
}

pub async fn create_contract(
    db: &DatabaseConnection,
    request: CreateContractRequest,
) -> Result<ContractDto, DomainError> {
    ensure_date_order(request.start_date, request.end_date)?;
    let student_ids = request.distinct_student_ids();
    let room_id = request.room_id;

    let txn = db.begin().await?;

    let number_taken = Contract::find()
        .filter(contract::Column::ContractNumber.eq(request.contract_number.as_str()))
        .count(&txn)
        .await?
        > 0;
    if number_taken {
        return Err(DomainError::Conflict("Contract number already exists".into()));
    }

    let target = find_live::<room::Entity, _>(&txn, room_id, "Room").await?;
    if !can_lease(target.status) {
        return Err(DomainError::Conflict("Room is not available".into()));
    }
    ensure_students_exist(&txn, &student_ids).await?;
    claim_room(&txn, room_id).await?;

    let now = Utc::now();
    let created = request.into_active_model(now).insert(&txn).await?;
    link_students(&txn, created.id, &student_ids, now).await?;

    let dto = assemble_one(&txn, created).await?;
    txn.commit().await?;

    tracing::info!(
        "Contract {} ({}) created: room {} occupied by {} student(s)",
        dto.id,
        dto.contract_number,
        room_id,
        dto.students.len()
    );
    Ok(dto)
}

pub async fn complete_contract(
    db: &DatabaseConnection,
    id: i32,
) -> Result<ContractDto, DomainError> {
    change_status(db, id, ContractStatus::Completed).await
}

pub async fn cancel_contract(db: &DatabaseConnection, id: i32) -> Result<ContractDto, DomainError> {
    change_status(db, id, ContractStatus::Cancelled).await
}

async fn change_status(
    db: &DatabaseConnection,
    id: i32,
    to: ContractStatus,
) -> Result<ContractDto, DomainError> {
    let txn = db.begin().await?;
    let existing = find_live::<Contract, _>(&txn, id, "Contract").await?;
    let from = existing.status;

    let transition = transition_room(&txn, &existing, to).await?;
    if let Transition::Release(_) = transition {
        let owed = outstanding_invoice_count(&txn, id).await?;
        if owed > 0 {
            tracing::warn!("Contract {} ends with {} outstanding invoice(s)", id, owed);
        }
    }

    let mut active: contract::ActiveModel = existing.into();
    active.status = Set(to);
    active.updated_at = Set(Some(Utc::now()));
    let updated = active.update(&txn).await?;

    let dto = assemble_one(&txn, updated).await?;
    txn.commit().await?;

    match transition {
        Transition::Unchanged => tracing::debug!("Contract {} already {:?}", id, to),
        _ => tracing::info!("Contract {} moved {:?} -> {:?}", id, from, to),
    }
    Ok(dto)
}

pub async fn update_contract(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateContractRequest,
) -> Result<ContractDto, DomainError> {
    let txn = db.begin().await?;
    let existing = find_live::<Contract, _>(&txn, id, "Contract").await?;

    if let Some(end_date) = request.end_date {
        ensure_date_order(existing.start_date, end_date)?;
    }

    let now = Utc::now();
    if let Some(student_ids) = request.distinct_student_ids() {
        ensure_students_exist(&txn, &student_ids).await?;
        contract_student::Entity::delete_many()
            .filter(contract_student::Column::ContractId.eq(id))
            .exec(&txn)
            .await?;
        link_students(&txn, id, &student_ids, now).await?;
    }

    let requested = request.requested_status();
    if let Some(to) = requested {
        transition_room(&txn, &existing, to).await?;
    }

    let mut active: contract::ActiveModel = existing.into();
    request.apply(&mut active, now);
    if let Some(to) = requested {
        active.status = Set(to);
    }
    let updated = active.update(&txn).await?;

    let dto = assemble_one(&txn, updated).await?;
    txn.commit().await?;
    tracing::info!("Contract {} updated", id);
    Ok(dto)
}

/// Soft-deletes the contract and its invoices; an active lease frees its room.
pub async fn delete_contract(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;
    let existing = find_live::<Contract, _>(&txn, id, "Contract").await?;

    if existing.status == ContractStatus::Active {
        release_room(&txn, existing.room_id, existing.id).await?;
    }

    let now = Utc::now();
    let invoices = invoice::Entity::update_many()
        .col_expr(invoice::Column::IsDeleted, Expr::value(true))
        .col_expr(invoice::Column::DeletedAt, Expr::value(now))
        .filter(invoice::Column::ContractId.eq(id))
        .filter(invoice::Column::IsDeleted.eq(false))
        .exec(&txn)
        .await?;

    let mut active: contract::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.deleted_at = Set(Some(now));
    active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(
        "Contract {} deleted with {} invoice(s)",
        id,
        invoices.rows_affected
    );
    Ok(())
}

/// Checks `from -> to` and applies the room side effect of the move.
async fn transition_room<C: ConnectionTrait>(
    conn: &C,
    existing: &contract::Model,
    to: ContractStatus,
) -> Result<Transition, DomainError> {
    let transition = plan_transition(existing.status, to).map_err(|reason| {
        tracing::warn!("Contract {} transition rejected: {}", existing.id, reason);
        DomainError::Conflict(reason)
    })?;

    match transition {
        Transition::Activate => claim_room(conn, existing.room_id).await?,
        Transition::Release(_) => release_room(conn, existing.room_id, existing.id).await?,
        Transition::Close(_) | Transition::Unchanged => {}
    }
    Ok(transition)
}

/// Available -> Occupied as a single conditional write.
async fn claim_room<C: ConnectionTrait>(conn: &C, room_id: i32) -> Result<(), DomainError> {
    let result = room::Entity::update_many()
        .col_expr(room::Column::Status, Expr::value(RoomStatus::Occupied))
        .col_expr(room::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(room::Column::Id.eq(room_id))
        .filter(room::Column::Status.eq(RoomStatus::Available))
        .filter(room::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        tracing::warn!("Room {} is not available for a new contract", room_id);
        return Err(DomainError::Conflict("Room is not available".into()));
    }
    Ok(())
}

/// Frees the room unless another active contract still holds it.
async fn release_room<C: ConnectionTrait>(
    conn: &C,
    room_id: i32,
    leaving_contract: i32,
) -> Result<(), DomainError> {
    let Some(current) = room::Entity::find_by_id(room_id).one(conn).await? else {
        return Ok(());
    };
    let others = Contract::find()
        .filter(contract::Column::RoomId.eq(room_id))
        .filter(contract::Column::Id.ne(leaving_contract))
        .filter(contract::Column::Status.eq(ContractStatus::Active))
        .filter(contract::Column::IsDeleted.eq(false))
        .count(conn)
        .await?;

    let next = status_after_release(current.status, others);
    if next != current.status {
        let mut active: room::ActiveModel = current.into();
        active.status = Set(next);
        active.updated_at = Set(Some(Utc::now()));
        active.update(conn).await?;
        tracing::info!("Room {} released", room_id);
    }
    Ok(())
}

fn ensure_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), DomainError> {
    if start < end {
        return Ok(());
    }
    let message = "Start date must be before end date";
    let mut errors = FieldErrors::new();
    errors.insert("endDate".into(), vec![message.into()]);
    Err(DomainError::Validation {
        message: message.into(),
        errors,
    })
}

async fn ensure_students_exist<C: ConnectionTrait>(
    conn: &C,
    student_ids: &[i32],
) -> Result<(), DomainError> {
    if student_ids.is_empty() {
        return Err(DomainError::invalid_field(
            "studentIds",
            "At least one student is required",
        ));
    }
    let found = student::Entity::find()
        .filter(student::Column::Id.is_in(student_ids.to_vec()))
        .filter(student::Column::IsDeleted.eq(false))
        .count(conn)
        .await?;
    if found != student_ids.len() as u64 {
        return Err(DomainError::not_found("Student"));
    }
    Ok(())
}

async fn link_students<C: ConnectionTrait>(
    conn: &C,
    contract_id: i32,
    student_ids: &[i32],
    joined_at: chrono::DateTime<Utc>,
) -> Result<(), DomainError> {
    let rows = student_ids.iter().map(|student_id| contract_student::ActiveModel {
        contract_id: Set(contract_id),
        student_id: Set(*student_id),
        joined_at: Set(joined_at),
    });
    contract_student::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn assemble_one<C: ConnectionTrait>(
    conn: &C,
    model: contract::Model,
) -> Result<ContractDto, DomainError> {
    let mut dtos = assemble(conn, vec![model]).await?;
    dtos.pop()
        .ok_or_else(|| DomainError::Internal("contract assembly returned nothing".into()))
}

/// Attaches room numbers and co-signers through explicit join queries.
async fn assemble<C: ConnectionTrait>(
    conn: &C,
    models: Vec<contract::Model>,
) -> Result<Vec<ContractDto>, DomainError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let contract_ids: Vec<i32> = models.iter().map(|c| c.id).collect();
    let room_ids: Vec<i32> = models.iter().map(|c| c.room_id).collect();

    let room_numbers: HashMap<i32, String> = room::Entity::find()
        .filter(room::Column::Id.is_in(room_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| (r.id, r.room_number))
        .collect();

    let links = contract_student::Entity::find()
        .filter(contract_student::Column::ContractId.is_in(contract_ids))
        .order_by_asc(contract_student::Column::JoinedAt)
        .order_by_asc(contract_student::Column::StudentId)
        .all(conn)
        .await?;

    let student_ids: Vec<i32> = links.iter().map(|l| l.student_id).collect();
    let students: HashMap<i32, student::Model> = if student_ids.is_empty() {
        HashMap::new()
    } else {
        student::Entity::find()
            .filter(student::Column::Id.is_in(student_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    };

    let mut by_contract: HashMap<i32, Vec<ContractStudentDto>> = HashMap::new();
    for link in links {
        if let Some(s) = students.get(&link.student_id) {
            by_contract
                .entry(link.contract_id)
                .or_default()
                .push(ContractStudentDto {
                    student_id: s.id,
                    student_code: s.student_code.clone(),
                    full_name: s.full_name.clone(),
                    joined_at: link.joined_at,
                });
        }
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let room_number = room_numbers.get(&model.room_id).cloned();
            let students = by_contract.remove(&model.id).unwrap_or_default();
            ContractDto::assemble(model, room_number, students)
        })
        .collect())
}

/// Unpaid or overdue invoices still attached to a contract.
async fn outstanding_invoice_count<C: ConnectionTrait>(
    conn: &C,
    contract_id: i32,
) -> Result<u64, DomainError> {
    Ok(invoice::Entity::find()
        .filter(invoice::Column::ContractId.eq(contract_id))
        .filter(invoice::Column::IsDeleted.eq(false))
        .filter(invoice::Column::Status.is_in([InvoiceStatus::Unpaid, InvoiceStatus::Overdue]))
        .count(conn)
        .await?)
}

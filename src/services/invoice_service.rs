//! Invoice Service - monthly billing against contracts

use chrono::Utc;
use sea_orm::*;

use super::listing::{fetch_page, find_live};
use crate::domain::{DomainError, Page, PageRequest};
use crate::models::enums::InvoiceStatus;
use crate::models::invoice::{
    self, CreateInvoiceRequest, Entity as Invoice, InvoiceDto, UpdateInvoiceRequest,
};
use crate::models::{Visibility, contract, scoped};

/// Filter parameters for listing invoices
#[derive(Debug, Default, Clone)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub contract_id: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    /// Unpaid or Overdue only.
    pub outstanding: bool,
}

pub async fn list_invoices(
    db: &DatabaseConnection,
    filter: InvoiceFilter,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<InvoiceDto>, DomainError> {
    let mut condition = Condition::all();
    if let Some(status) = filter.status {
        condition = condition.add(invoice::Column::Status.eq(status));
    }
    if filter.outstanding {
        condition = condition.add(
            invoice::Column::Status.is_in([InvoiceStatus::Unpaid, InvoiceStatus::Overdue]),
        );
    }
    if let Some(contract_id) = filter.contract_id {
        condition = condition.add(invoice::Column::ContractId.eq(contract_id));
    }
    if let Some(month) = filter.month {
        condition = condition.add(invoice::Column::Month.eq(month));
    }
    if let Some(year) = filter.year {
        condition = condition.add(invoice::Column::Year.eq(year));
    }

    let select = scoped::<Invoice>(visibility)
        .filter(condition)
        .order_by_asc(invoice::Column::Id);
    Ok(fetch_page(db, select, page).await?.map(InvoiceDto::from))
}

pub async fn list_invoices_by_contract(
    db: &DatabaseConnection,
    contract_id: i32,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<InvoiceDto>, DomainError> {
    find_live::<contract::Entity, _>(db, contract_id, "Contract").await?;
    let filter = InvoiceFilter {
        contract_id: Some(contract_id),
        ..Default::default()
    };
    list_invoices(db, filter, visibility, page).await
}

pub async fn list_unpaid_invoices(
    db: &DatabaseConnection,
    page: PageRequest,
) -> Result<Page<InvoiceDto>, DomainError> {
    let filter = InvoiceFilter {
        outstanding: true,
        ..Default::default()
    };
    list_invoices(db, filter, Visibility::Live, page).await
}

pub async fn get_invoice(db: &DatabaseConnection, id: i32) -> Result<InvoiceDto, DomainError> {
    Ok(find_live::<Invoice, _>(db, id, "Invoice").await?.into())
}

/// Issues an invoice; the period check and the insert share one transaction.
pub async fn create_invoice(
    db: &DatabaseConnection,
    request: CreateInvoiceRequest,
) -> Result<InvoiceDto, DomainError> {
    let txn = db.begin().await?;
    find_live::<contract::Entity, _>(&txn, request.contract_id, "Contract").await?;

    let period_taken = Invoice::find()
        .filter(invoice::Column::ContractId.eq(request.contract_id))
        .filter(invoice::Column::Month.eq(request.month))
        .filter(invoice::Column::Year.eq(request.year))
        .filter(invoice::Column::IsDeleted.eq(false))
        .count(&txn)
        .await?
        > 0;
    if period_taken {
        tracing::warn!(
            "Duplicate invoice for contract {} period {:02}/{}",
            request.contract_id,
            request.month,
            request.year
        );
        return Err(DomainError::Conflict(
            "Invoice already exists for this month/year".into(),
        ));
    }

    let number_taken = Invoice::find()
        .filter(invoice::Column::InvoiceNumber.eq(request.invoice_number.as_str()))
        .count(&txn)
        .await?
        > 0;
    if number_taken {
        return Err(DomainError::Conflict("Invoice number already exists".into()));
    }

    let created = request.into_active_model(Utc::now()).insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        "Invoice {} issued for contract {} ({:02}/{}): total {}",
        created.invoice_number,
        created.contract_id,
        created.month,
        created.year,
        created.total_amount
    );
    Ok(created.into())
}

pub async fn update_invoice(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateInvoiceRequest,
) -> Result<InvoiceDto, DomainError> {
    let existing = find_live::<Invoice, _>(db, id, "Invoice").await?;
    let mut active: invoice::ActiveModel = existing.into();
    request.apply(&mut active, Utc::now());
    let updated = active.update(db).await?;
    tracing::info!("Invoice {} updated ({:?})", id, updated.status);
    Ok(updated.into())
}

/// Marks any live invoice Paid and stamps `paymentDate` with the current time.
pub async fn mark_invoice_paid(
    db: &DatabaseConnection,
    id: i32,
) -> Result<InvoiceDto, DomainError> {
    let existing = find_live::<Invoice, _>(db, id, "Invoice").await?;
    let previous = existing.status;

    let now = Utc::now();
    let mut active: invoice::ActiveModel = existing.into();
    active.status = Set(InvoiceStatus::Paid);
    active.payment_date = Set(Some(now));
    active.updated_at = Set(Some(now));
    let updated = active.update(db).await?;

    if previous == InvoiceStatus::Cancelled {
        tracing::warn!("Cancelled invoice {} marked as paid", updated.invoice_number);
    }
    tracing::info!("Invoice {} paid", updated.invoice_number);
    Ok(updated.into())
}

pub async fn delete_invoice(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let existing = find_live::<Invoice, _>(db, id, "Invoice").await?;
    let mut active: invoice::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.deleted_at = Set(Some(Utc::now()));
    active.update(db).await?;
    tracing::info!("Invoice {} deleted", id);
    Ok(())
}

use axum::extract::State;
use serde::Deserialize;

use super::envelope::{ApiPath, ApiQuery, ApiResponse, Created, Empty, Paginated, ValidatedJson, deleted};
use crate::auth::{Claims, Policy};
use crate::domain::{DomainError, PageQuery};
use crate::infrastructure::AppState;
use crate::models::enums::InvoiceStatus;
use crate::models::invoice::{CreateInvoiceRequest, InvoiceDto, UpdateInvoiceRequest};
use crate::services::invoice_service::{self, InvoiceFilter};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicesQuery {
    pub status: Option<InvoiceStatus>,
    pub contract_id: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
}

pub async fn list_invoices(
    State(state): State<AppState>,
    claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
    ApiQuery(params): ApiQuery<InvoicesQuery>,
) -> Result<Paginated<InvoiceDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let filter = InvoiceFilter {
        status: params.status,
        contract_id: params.contract_id,
        month: params.month,
        year: params.year,
        outstanding: false,
    };
    let page =
        invoice_service::list_invoices(state.db(), filter, visibility, query.to_request()?).await?;
    Ok(page.into())
}

pub async fn list_invoices_by_contract(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(contract_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Paginated<InvoiceDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let page = invoice_service::list_invoices_by_contract(
        state.db(),
        contract_id,
        visibility,
        query.to_request()?,
    )
    .await?;
    Ok(page.into())
}

pub async fn list_unpaid_invoices(
    State(state): State<AppState>,
    _claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Paginated<InvoiceDto>, DomainError> {
    let page = invoice_service::list_unpaid_invoices(state.db(), query.to_request()?).await?;
    Ok(page.into())
}

pub async fn get_invoice(
    State(state): State<AppState>,
    _claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<InvoiceDto>, DomainError> {
    Ok(ApiResponse::ok(
        invoice_service::get_invoice(state.db(), id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice issued with status Unpaid"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Billing period already invoiced or duplicate invoice number")
    )
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    claims: Claims,
    ValidatedJson(payload): ValidatedJson<CreateInvoiceRequest>,
) -> Result<Created<InvoiceDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let invoice = invoice_service::create_invoice(state.db(), payload).await?;
    Ok(Created(invoice, "Invoice created successfully"))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateInvoiceRequest>,
) -> Result<ApiResponse<InvoiceDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let invoice = invoice_service::update_invoice(state.db(), id, payload).await?;
    Ok(ApiResponse::with_message(
        invoice,
        "Invoice updated successfully",
    ))
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}/mark-paid",
    params(("id" = i32, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice marked as paid"),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice was cancelled")
    )
)]
pub async fn mark_invoice_paid(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<InvoiceDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let invoice = invoice_service::mark_invoice_paid(state.db(), id).await?;
    Ok(ApiResponse::with_message(
        invoice,
        "Invoice marked as paid",
    ))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Empty>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    invoice_service::delete_invoice(state.db(), id).await?;
    Ok(deleted("Invoice"))
}

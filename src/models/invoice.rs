use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{InvoiceStatus, parse_variant};
use crate::domain::validation::{RequiredFields, validate_invoice_status};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub contract_id: i32,
    pub month: i32,
    pub year: i32,
    pub rent_amount: f64,
    pub service_amount: f64,
    /// Always `rent_amount + service_amount`.
    pub total_amount: f64,
    pub status: InvoiceStatus,
    pub due_date: Date,
    pub payment_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contract::Entity",
        from = "Column::ContractId",
        to = "super::contract::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Contract,
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::SoftDelete for Entity {
    fn deleted_flag() -> Column {
        Column::IsDeleted
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    pub id: i32,
    pub invoice_number: String,
    pub contract_id: i32,
    pub month: i32,
    pub year: i32,
    pub rent_amount: f64,
    pub service_amount: f64,
    pub total_amount: f64,
    pub status: InvoiceStatus,
    pub due_date: Date,
    pub payment_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for InvoiceDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            invoice_number: model.invoice_number,
            contract_id: model.contract_id,
            month: model.month,
            year: model.year,
            rent_amount: model.rent_amount,
            service_amount: model.service_amount,
            total_amount: model.total_amount,
            status: model.status,
            due_date: model.due_date,
            payment_date: model.payment_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInvoiceRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Invoice number must be between 1 and 50 characters"
    ))]
    pub invoice_number: String,
    #[validate(range(min = 1, message = "Contract ID must be greater than 0"))]
    pub contract_id: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: i32,
    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: i32,
    #[validate(range(min = 0.0, message = "Rent amount cannot be negative"))]
    pub rent_amount: f64,
    #[validate(range(min = 0.0, message = "Service amount cannot be negative"))]
    pub service_amount: f64,
    pub due_date: Date,
}

impl CreateInvoiceRequest {
    pub fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            invoice_number: Set(self.invoice_number),
            contract_id: Set(self.contract_id),
            month: Set(self.month),
            year: Set(self.year),
            rent_amount: Set(self.rent_amount),
            service_amount: Set(self.service_amount),
            total_amount: Set(self.rent_amount + self.service_amount),
            status: Set(InvoiceStatus::Unpaid),
            due_date: Set(self.due_date),
            payment_date: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
            deleted_at: Set(None),
            is_deleted: Set(false),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    #[validate(custom(function = "validate_invoice_status"))]
    pub status: Option<String>,
    pub payment_date: Option<DateTimeUtc>,
}

impl UpdateInvoiceRequest {
    pub fn apply(self, active: &mut ActiveModel, now: DateTimeUtc) {
        let status = self.status.as_deref().and_then(parse_variant::<InvoiceStatus>);
        if let Some(status) = status {
            active.status = Set(status);
        }
        match (status, self.payment_date) {
            (_, Some(paid_at)) => active.payment_date = Set(Some(paid_at)),
            (Some(InvoiceStatus::Paid), None) => active.payment_date = Set(Some(now)),
            _ => {}
        }
        active.updated_at = Set(Some(now));
    }
}

impl RequiredFields for CreateInvoiceRequest {
    const REQUIRED: &'static [&'static str] = &["invoiceNumber", "contractId", "month", "year", "rentAmount", "serviceAmount", "dueDate"];
}

impl RequiredFields for UpdateInvoiceRequest {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    fn sample() -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            invoice_number: "INV-2025-01".into(),
            contract_id: 7,
            month: 1,
            year: 2025,
            rent_amount: 2_000_000.0,
            service_amount: 100_000.0,
            due_date: Date::from_ymd_opt(2025, 1, 10).unwrap(),
        }
    }

    #[test]
    fn total_is_rent_plus_service() {
        let active = sample().into_active_model(Utc::now());
        assert_eq!(active.total_amount, ActiveValue::Set(2_100_000.0));
        assert_eq!(active.status, ActiveValue::Set(InvoiceStatus::Unpaid));
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        let mut request = sample();
        request.month = 13;
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("month"));
    }

    #[test]
    fn marking_paid_without_date_stamps_now() {
        let now = Utc::now();
        let mut active = sample().into_active_model(now);
        UpdateInvoiceRequest {
            status: Some("Paid".into()),
            payment_date: None,
        }
        .apply(&mut active, now);
        assert_eq!(active.payment_date, ActiveValue::Set(Some(now)));
    }
}

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::{
    entity::{payslip, sea_orm_active_enums::PayslipStatus},
    payroll::{ContributionLine, DetailLevel, GrossBreakdown, MonthInput, Period},
    utils::format_amount_fr,
};

use super::*;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeneratePayslip {
    pub(super) employee_id: Uuid,
    pub(super) year: i32,
    pub(super) month: MonthInput,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct BreakdownQuery {
    #[serde(default)]
    pub(super) detail: DetailLevel,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PayslipResponse {
    pub(super) id: Uuid,
    pub(super) employee_id: Uuid,
    pub(super) period: Period,
    pub(super) monthly_variables_id: Uuid,
    pub(super) gross_salary: Decimal,
    pub(super) net_salary: Decimal,
    pub(super) rate_year: i32,
    pub(super) status: PayslipStatus,
    pub(super) created_at: DateTimeWithTimeZone,
    pub(super) updated_at: DateTimeWithTimeZone,
}

impl From<&payslip::Model> for PayslipResponse {
    fn from(model: &payslip::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            period: Period { year: model.year, month: model.month.max(0) as u32 },
            monthly_variables_id: model.monthly_variables_id,
            gross_salary: model.gross_salary(),
            net_salary: model.net_salary(),
            rate_year: model.rate_year,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Document view of a payslip, with the contribution lines at the requested
/// detail level.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PayslipBreakdown {
    pub(super) payslip: PayslipResponse,
    pub(super) detail: DetailLevel,
    pub(super) gross: GrossBreakdown,
    pub(super) monthly_ceiling: Decimal,
    pub(super) capped_base: Decimal,
    pub(super) employee_contributions: Vec<ContributionLine>,
    pub(super) employer_contributions: Vec<ContributionLine>,
    pub(super) total_employee_deductions: Decimal,
    pub(super) net_salary: Decimal,
    pub(super) employer_charges: Decimal,
    pub(super) total_employer_cost: Decimal,
    pub(super) formatted: FormattedTotals,
}

/// Totals as printed, `3 033,40`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FormattedTotals {
    pub(super) gross_salary: String,
    pub(super) total_employee_deductions: String,
    pub(super) net_salary: String,
    pub(super) employer_charges: String,
    pub(super) total_employer_cost: String,
}

impl FormattedTotals {
    pub(super) fn new(gross_salary: Decimal, total_employee_deductions: Decimal, net_salary: Decimal, employer_charges: Decimal, total_employer_cost: Decimal) -> Self {
        Self {
            gross_salary: format_amount_fr(gross_salary),
            total_employee_deductions: format_amount_fr(total_employee_deductions),
            net_salary: format_amount_fr(net_salary),
            employer_charges: format_amount_fr(employer_charges),
            total_employer_cost: format_amount_fr(total_employer_cost),
        }
    }
}

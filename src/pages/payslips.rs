use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    entity::{payslip, sea_orm_active_enums::PayslipStatus},
    payroll::{self, ComputationError, MonthlyVariables, Period, RateRegistry},
    repo::{self, RepoError},
};

use super::ApiError;

use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(generate_payslip)
        .service(get_payslip)
        .service(get_payslip_breakdown)
        .service(mark_payslip_sent)
        .service(mark_payslip_viewed);
}

/// Payroll provider generates the payslip of a period. The variables are
/// validated and the payslip stored in one transaction.
#[post("")]
async fn generate_payslip(db: web::Data<DatabaseConnection>, rates: web::Data<RateRegistry>, payload: web::Json<GeneratePayslip>) -> Result<HttpResponse, ApiError> {
    let GeneratePayslip { employee_id, year, month } = payload.into_inner();
    let period = Period::new(year, month.parse()?)?;

    let employee = repo::find_employee(db.as_ref(), employee_id).await?;
    let table = rates.for_year(period.year)?;

    let txn = db.begin().await?;

    let variables = repo::find_variables(&txn, employee.id, period).await?
        .ok_or(RepoError::VariablesNotFound { employee_id, period })?;
    let variables = repo::mark_variables_validated(&txn, &variables).await?;

    let computation = payroll::compute_payslip(&MonthlyVariables::from(&variables), employee.hourly_rate(), table)?;
    let saved = repo::save_payslip(&txn, &variables, &computation).await?;

    txn.commit().await?;

    info!(
        payslip_id = %saved.model.id,
        %employee_id,
        %period,
        gross = %computation.gross_salary(),
        net = %computation.net_salary(),
        regenerated = !saved.created,
        "Payslip generated"
    );

    let response = PayslipResponse::from(&saved.model);
    if saved.created {
        Ok(HttpResponse::Created().json(web::Json(response)))
    } else {
        Ok(HttpResponse::Ok().json(web::Json(response)))
    }
}

#[get("/{payslip_id}")]
async fn get_payslip(payslip: payslip::Model) -> impl Responder {
    web::Json(PayslipResponse::from(&payslip))
}

#[get("/{payslip_id}/breakdown")]
async fn get_payslip_breakdown(
    db: web::Data<DatabaseConnection>,
    rates: web::Data<RateRegistry>,
    payslip: payslip::Model,
    query: web::Query<BreakdownQuery>,
) -> Result<HttpResponse, ApiError> {
    let employee = repo::find_employee(db.as_ref(), payslip.employee_id).await?;
    let variables = repo::find_variables_by_id(db.as_ref(), payslip.monthly_variables_id).await?;
    let table = rates.for_year(payslip.rate_year)?;

    let computation = payroll::compute_payslip(&MonthlyVariables::from(&variables), employee.hourly_rate(), table)?;

    // The document must agree with the payslip it describes
    if computation.gross_salary() != payslip.gross_salary() || computation.net_salary() != payslip.net_salary() {
        return Err(ComputationError::StoredFiguresMismatch {
            payslip_id: payslip.id,
            stored: payslip.net_salary(),
            computed: computation.net_salary(),
        }.into());
    }

    let detail = query.detail;
    let deductions = &computation.deductions;

    let breakdown = PayslipBreakdown {
        payslip: PayslipResponse::from(&payslip),
        detail,
        monthly_ceiling: deductions.monthly_ceiling,
        capped_base: deductions.capped_base,
        employee_contributions: deductions.employee_lines(detail),
        employer_contributions: deductions.employer_lines(detail),
        total_employee_deductions: deductions.total_employee_deductions,
        net_salary: deductions.net_salary,
        employer_charges: deductions.employer_charges,
        total_employer_cost: deductions.total_employer_cost,
        formatted: FormattedTotals::new(
            deductions.gross_salary,
            deductions.total_employee_deductions,
            deductions.net_salary,
            deductions.employer_charges,
            deductions.total_employer_cost,
        ),
        gross: computation.gross.clone(),
    };

    Ok(HttpResponse::Ok().json(web::Json(breakdown)))
}

#[post("/{payslip_id}/sent")]
async fn mark_payslip_sent(db: web::Data<DatabaseConnection>, payslip: payslip::Model) -> Result<HttpResponse, ApiError> {
    let payslip = repo::advance_payslip(db.as_ref(), &payslip, PayslipStatus::Sent).await?;

    Ok(HttpResponse::Ok().json(web::Json(PayslipResponse::from(&payslip))))
}

#[post("/{payslip_id}/viewed")]
async fn mark_payslip_viewed(db: web::Data<DatabaseConnection>, payslip: payslip::Model) -> Result<HttpResponse, ApiError> {
    let payslip = repo::advance_payslip(db.as_ref(), &payslip, PayslipStatus::Viewed).await?;

    Ok(HttpResponse::Ok().json(web::Json(PayslipResponse::from(&payslip))))
}

use actix_web::{post, web, HttpResponse};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::{
    payroll::{self, MonthlyVariablesPayload, RateRegistry},
    repo,
};

use super::ApiError;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(preview_payslip);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PreviewRequest {
    #[serde(flatten)]
    pub(super) variables: MonthlyVariablesPayload,
    /// Overrides the employee's stored rate, for what-if entries
    pub(super) hourly_rate: Option<Decimal>,
}

/// Live estimate while the client types. Nothing is stored.
#[post("")]
async fn preview_payslip(db: web::Data<DatabaseConnection>, rates: web::Data<RateRegistry>, payload: web::Json<PreviewRequest>) -> Result<HttpResponse, ApiError> {
    let PreviewRequest { variables, hourly_rate } = payload.into_inner();
    let variables = variables.validate()?;

    let hourly_rate = match hourly_rate {
        Some(rate) => payroll::validate_hourly_rate(rate)?,
        None => repo::find_employee(db.as_ref(), variables.employee_id).await?.hourly_rate(),
    };

    let table = rates.for_year(variables.period.year)?;
    let preview = payroll::preview(&variables, hourly_rate, table)?;

    Ok(HttpResponse::Ok().json(web::Json(preview)))
}

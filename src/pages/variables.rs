use actix_web::{get, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    entity::{employee, monthly_variables},
    payroll::{MonthInput, MonthlyVariables, MonthlyVariablesPayload, Period},
    repo::{self, RepoError},
};

use super::ApiError;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(submit_variables)
        .service(get_variables);
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VariablesResponse {
    pub(super) id: Uuid,
    #[serde(flatten)]
    pub(super) variables: MonthlyVariables,
}

impl From<&monthly_variables::Model> for VariablesResponse {
    fn from(model: &monthly_variables::Model) -> Self {
        Self {
            id: model.id,
            variables: model.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PeriodPath {
    year: i32,
    month: String,
}

/// Client entry screen. Re-submitting a period overwrites it until the payroll
/// provider validates it.
#[put("")]
async fn submit_variables(db: web::Data<DatabaseConnection>, payload: web::Json<MonthlyVariablesPayload>) -> Result<HttpResponse, ApiError> {
    let variables = payload.into_inner().validate()?;

    let employee = repo::find_employee(db.as_ref(), variables.employee_id).await?;
    let upserted = repo::upsert_variables(db.as_ref(), &variables).await?;

    info!(employee_id = %employee.id, period = %variables.period, status = ?variables.status, "Monthly variables submitted");

    let response = VariablesResponse::from(&upserted.model);
    if upserted.created {
        Ok(HttpResponse::Created().json(web::Json(response)))
    } else {
        Ok(HttpResponse::Ok().json(web::Json(response)))
    }
}

#[get("/{employee_id}/{year}/{month}")]
async fn get_variables(db: web::Data<DatabaseConnection>, employee: employee::Model, path: web::Path<PeriodPath>) -> Result<HttpResponse, ApiError> {
    let PeriodPath { year, month } = path.into_inner();
    let period = Period::new(year, MonthInput::Text(month).parse()?)?;

    let model = repo::find_variables(db.as_ref(), employee.id, period).await?
        .ok_or(RepoError::VariablesNotFound { employee_id: employee.id, period })?;

    Ok(HttpResponse::Ok().json(web::Json(VariablesResponse::from(&model))))
}

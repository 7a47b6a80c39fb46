use actix_web::{get, post, web, HttpResponse, Responder};
use rust_decimal::Decimal;
use sea_orm::{prelude::DateTimeWithTimeZone, DatabaseConnection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entity::employee,
    payroll::{self, ValidationError},
    repo::{self, NewEmployee},
};

use super::ApiError;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_employee)
        .service(get_employee);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateEmployee {
    pub(super) full_name: String,
    pub(super) hourly_rate: Decimal,
    pub(super) employer_company_id: Uuid,
    pub(super) client_company_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EmployeeResponse {
    pub(super) id: Uuid,
    pub(super) full_name: String,
    pub(super) hourly_rate: Decimal,
    pub(super) employer_company_id: Uuid,
    pub(super) client_company_id: Uuid,
    pub(super) created_at: DateTimeWithTimeZone,
}

impl From<employee::Model> for EmployeeResponse {
    fn from(model: employee::Model) -> Self {
        Self {
            id: model.id,
            hourly_rate: model.hourly_rate(),
            full_name: model.full_name,
            employer_company_id: model.employer_company_id,
            client_company_id: model.client_company_id,
            created_at: model.created_at,
        }
    }
}

impl CreateEmployee {
    fn validate(self) -> Result<NewEmployee, ValidationError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::EmptyField("fullName"));
        }

        Ok(NewEmployee {
            full_name: full_name.to_string(),
            hourly_rate: payroll::validate_hourly_rate(self.hourly_rate)?,
            employer_company_id: self.employer_company_id,
            client_company_id: self.client_company_id,
        })
    }
}

#[post("")]
async fn create_employee(db: web::Data<DatabaseConnection>, payload: web::Json<CreateEmployee>) -> Result<HttpResponse, ApiError> {
    let new = payload.into_inner().validate()?;

    let employee = repo::insert_employee(db.as_ref(), new).await?;

    Ok(HttpResponse::Created()
        .json(web::Json(EmployeeResponse::from(employee))))
}

#[get("/{employee_id}")]
async fn get_employee(employee: employee::Model) -> impl Responder {
    web::Json(EmployeeResponse::from(employee))
}

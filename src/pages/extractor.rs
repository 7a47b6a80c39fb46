//! Path extractors loading the record named by `{employee_id}` or `{payslip_id}`.

use std::str::FromStr;

use actix_web::{dev, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    entity::{employee, payslip},
    repo,
};

use super::ApiError;

fn path_id(req: &HttpRequest, name: &'static str) -> Result<Uuid, actix_web::Error> {
    let Some(id) = req.match_info().get(name) else {
        return Err(actix_web::error::ErrorInternalServerError(format!("route has no `{name}` segment")));
    };

    Uuid::from_str(id).map_err(|_| actix_web::error::ErrorBadRequest(format!("invalid `{name}`")))
}

fn database(req: &HttpRequest) -> Result<web::Data<DatabaseConnection>, actix_web::Error> {
    req.app_data::<web::Data<DatabaseConnection>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("database connection is not attached"))
}

impl FromRequest for employee::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let employee_id = path_id(&req, "employee_id")?;
            let db = database(&req)?;

            let employee = repo::find_employee(db.as_ref(), employee_id).await
                .map_err(ApiError::from)?;

            Ok(employee)
        })
    }
}

impl FromRequest for payslip::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let payslip_id = path_id(&req, "payslip_id")?;
            let db = database(&req)?;

            let payslip = repo::find_payslip(db.as_ref(), payslip_id).await
                .map_err(ApiError::from)?;

            Ok(payslip)
        })
    }
}

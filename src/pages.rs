use actix_web::{body, http::{header::ContentType, StatusCode}, web, HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::{
    payroll::{ComputationError, RateTableError, TransitionError, ValidationError},
    repo::RepoError,
};

mod extractor;

mod employees;
mod payslips;
mod preview;
mod variables;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/employees")
            .configure(employees::config))
        .service(web::scope("/variables")
            .configure(variables::config))
        .service(web::scope("/payslips")
            .configure(payslips::config))
        .service(web::scope("/preview")
            .configure(preview::config));
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error(transparent)]
    RateTable(#[from] RateTableError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DbErr> for ApiError {
    fn from(value: DbErr) -> Self {
        ApiError::Repo(value.into())
    }
}

impl From<TransitionError> for ApiError {
    fn from(value: TransitionError) -> Self {
        ApiError::Repo(value.into())
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        let status = self.status_code();

        // Internals stay in the logs
        let body = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status)
            .insert_header(ContentType::plaintext())
            .body(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Computation(ComputationError::Overflow(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateTable(RateTableError::NoTableForYear(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateTable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Repo(err) => match err {
                RepoError::EmployeeNotFound(_)
                | RepoError::VariablesNotFound { .. }
                | RepoError::VariablesIdNotFound(_)
                | RepoError::PayslipNotFound(_) => StatusCode::NOT_FOUND,
                RepoError::Transition(_) => StatusCode::CONFLICT,
                RepoError::Overflow(_) => StatusCode::BAD_REQUEST,
                RepoError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

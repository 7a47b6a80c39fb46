//! Storage operations over the sea-orm entities.
//!
//! Functions are generic over [`ConnectionTrait`] so the payslip workflow can
//! run them inside a transaction.

use chrono::Local;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveEnum,
    ActiveValue::{Set, Unchanged},
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Iterable, QueryFilter,
};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    entity::{
        employee, monthly_variables, payslip,
        prelude::*,
        sea_orm_active_enums::{PayslipStatus, VariablesStatus},
    },
    payroll::{MonthlyVariables as Variables, PayslipComputation, Period, TransitionError},
    utils,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("employee `{0}` not found")]
    EmployeeNotFound(Uuid),

    #[error("no monthly variables for employee `{employee_id}` in {period}")]
    VariablesNotFound { employee_id: Uuid, period: Period },

    #[error("monthly variables `{0}` not found")]
    VariablesIdNotFound(Uuid),

    #[error("payslip `{0}` not found")]
    PayslipNotFound(Uuid),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("`{0}` does not fit in storage")]
    Overflow(&'static str),
}

pub struct NewEmployee {
    pub full_name: String,
    pub hourly_rate: Decimal,
    pub employer_company_id: Uuid,
    pub client_company_id: Uuid,
}

/// Stored record plus whether the period was new
#[derive(Debug)]
pub struct Upserted<T> {
    pub model: T,
    pub created: bool,
}

fn hundredths(field: &'static str, value: Decimal) -> Result<i64, RepoError> {
    utils::to_hundredths(value).ok_or(RepoError::Overflow(field))
}

fn period_month(period: Period) -> Result<i16, RepoError> {
    i16::try_from(period.month).map_err(|_| RepoError::Overflow("month"))
}

pub async fn insert_employee<C: ConnectionTrait>(db: &C, new: NewEmployee) -> Result<employee::Model, RepoError> {
    let now = Local::now().fixed_offset();

    let model = employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        full_name: Set(new.full_name),
        hourly_rate_cents: Set(hundredths("hourlyRate", new.hourly_rate)?),
        employer_company_id: Set(new.employer_company_id),
        client_company_id: Set(new.client_company_id),
    };

    let model = Employee::insert(model)
        .exec_with_returning(db).await?;

    info!(employee_id = %model.id, "Registered employee");

    Ok(model)
}

pub async fn find_employee<C: ConnectionTrait>(db: &C, employee_id: Uuid) -> Result<employee::Model, RepoError> {
    Employee::find_by_id(employee_id)
        .one(db).await?
        .ok_or(RepoError::EmployeeNotFound(employee_id))
}

pub async fn find_variables<C: ConnectionTrait>(db: &C, employee_id: Uuid, period: Period) -> Result<Option<monthly_variables::Model>, RepoError> {
    let model = MonthlyVariables::find()
        .filter(monthly_variables::Column::EmployeeId.eq(employee_id))
        .filter(monthly_variables::Column::Year.eq(period.year))
        .filter(monthly_variables::Column::Month.eq(period_month(period)?))
        .one(db).await?;

    Ok(model)
}

pub async fn find_variables_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<monthly_variables::Model, RepoError> {
    MonthlyVariables::find_by_id(id)
        .one(db).await?
        .ok_or(RepoError::VariablesIdNotFound(id))
}

/// Inserts or overwrites the record for the variables' period.
///
/// The existing row keeps its id. A validated period refuses anything but
/// another validation, checked by the conflict update itself.
pub async fn upsert_variables<C: ConnectionTrait>(db: &C, variables: &Variables) -> Result<Upserted<monthly_variables::Model>, RepoError> {
    let period = variables.period;
    let existing = find_variables(db, variables.employee_id, period).await?;

    let now = Local::now().fixed_offset();
    let model = monthly_variables::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        employee_id: Set(variables.employee_id),
        month: Set(period_month(period)?),
        year: Set(period.year),
        hours_worked_hundredths: Set(hundredths("hoursWorked", variables.hours_worked)?),
        overtime_hours_hundredths: Set(hundredths("overtimeHours", variables.overtime_hours)?),
        vacation_days: Set(i32::try_from(variables.vacation_days).map_err(|_| RepoError::Overflow("vacationDays"))?),
        sick_days: Set(i32::try_from(variables.sick_days).map_err(|_| RepoError::Overflow("sickDays"))?),
        bonuses_cents: Set(hundredths("bonuses", variables.bonuses)?),
        status: Set(variables.status),
    };

    let mut on_conflict = OnConflict::columns([
        monthly_variables::Column::EmployeeId,
        monthly_variables::Column::Year,
        monthly_variables::Column::Month,
    ]);
    on_conflict.update_columns([
        monthly_variables::Column::UpdatedAt,
        monthly_variables::Column::HoursWorkedHundredths,
        monthly_variables::Column::OvertimeHoursHundredths,
        monthly_variables::Column::VacationDays,
        monthly_variables::Column::SickDays,
        monthly_variables::Column::BonusesCents,
        monthly_variables::Column::Status,
    ]);
    if variables.status != VariablesStatus::Validated {
        on_conflict.action_and_where(
            Expr::col((MonthlyVariables, monthly_variables::Column::Status))
                .ne(VariablesStatus::Validated.to_value())
        );
    }

    let affected = MonthlyVariables::insert(model)
        .on_conflict(on_conflict)
        .exec_without_returning(db).await?;

    let model = find_variables(db, variables.employee_id, period).await?
        .ok_or(RepoError::VariablesNotFound { employee_id: variables.employee_id, period })?;

    if affected == 0 {
        return Err(TransitionError::Variables { from: model.status, to: variables.status }.into());
    }

    debug!(variables_id = %model.id, employee_id = %model.employee_id, %period, status = ?model.status, created = existing.is_none(), "Upserted monthly variables");

    Ok(Upserted {
        model,
        created: existing.is_none(),
    })
}

pub async fn mark_variables_validated<C: ConnectionTrait>(db: &C, variables: &monthly_variables::Model) -> Result<monthly_variables::Model, RepoError> {
    let status = variables.status.transition_to(VariablesStatus::Validated)?;

    let model = MonthlyVariables::update(monthly_variables::ActiveModel {
        id: Unchanged(variables.id),
        status: Set(status),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    }).exec(db).await?;

    Ok(model)
}

/// Stores the figures for the period, overwriting an earlier generation.
/// A regenerated payslip starts over at `generated`.
pub async fn save_payslip<C: ConnectionTrait>(
    db: &C,
    variables: &monthly_variables::Model,
    computation: &PayslipComputation,
) -> Result<Upserted<payslip::Model>, RepoError> {
    let period = Period { year: variables.year, month: variables.month.max(0) as u32 };
    let existing = find_payslip_for_period(db, variables.employee_id, period).await?;

    let now = Local::now().fixed_offset();
    let model = payslip::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        employee_id: Set(variables.employee_id),
        month: Set(variables.month),
        year: Set(variables.year),
        monthly_variables_id: Set(variables.id),
        gross_salary_cents: Set(hundredths("grossSalary", computation.gross_salary())?),
        net_salary_cents: Set(hundredths("netSalary", computation.net_salary())?),
        rate_year: Set(computation.rate_year),
        status: Set(PayslipStatus::Generated),
    };

    Payslip::insert(model)
        .on_conflict(OnConflict::columns([
                payslip::Column::EmployeeId,
                payslip::Column::Year,
                payslip::Column::Month,
            ])
            .update_columns([
                payslip::Column::UpdatedAt,
                payslip::Column::MonthlyVariablesId,
                payslip::Column::GrossSalaryCents,
                payslip::Column::NetSalaryCents,
                payslip::Column::RateYear,
                payslip::Column::Status,
            ])
            .to_owned())
        .exec(db).await?;

    let model = find_payslip_for_period(db, variables.employee_id, period).await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("payslip of `{}` for {period}", variables.employee_id)))?;

    info!(payslip_id = %model.id, employee_id = %model.employee_id, %period, rate_year = model.rate_year, "Saved payslip");

    Ok(Upserted {
        model,
        created: existing.is_none(),
    })
}

pub async fn find_payslip<C: ConnectionTrait>(db: &C, payslip_id: Uuid) -> Result<payslip::Model, RepoError> {
    Payslip::find_by_id(payslip_id)
        .one(db).await?
        .ok_or(RepoError::PayslipNotFound(payslip_id))
}

pub async fn find_payslip_for_period<C: ConnectionTrait>(db: &C, employee_id: Uuid, period: Period) -> Result<Option<payslip::Model>, RepoError> {
    let model = Payslip::find()
        .filter(payslip::Column::EmployeeId.eq(employee_id))
        .filter(payslip::Column::Year.eq(period.year))
        .filter(payslip::Column::Month.eq(period_month(period)?))
        .one(db).await?;

    Ok(model)
}

/// Moves a payslip forward. The update only applies to rows still behind
/// `to`, so a stale `payslip` cannot move a newer status backwards.
pub async fn advance_payslip<C: ConnectionTrait>(db: &C, payslip: &payslip::Model, to: PayslipStatus) -> Result<payslip::Model, RepoError> {
    let status = payslip.status.advance_to(to)?;
    if status == payslip.status {
        return Ok(payslip.clone());
    }

    let behind = PayslipStatus::iter()
        .filter(|status| *status < to)
        .map(|status| status.to_value())
        .collect::<Vec<_>>();

    let res = Payslip::update_many()
        .set(payslip::ActiveModel {
            status: Set(to),
            updated_at: Set(Local::now().fixed_offset()),
            ..Default::default()
        })
        .filter(payslip::Column::Id.eq(payslip.id))
        .filter(payslip::Column::Status.is_in(behind))
        .exec(db).await?;

    let model = find_payslip(db, payslip.id).await?;

    if res.rows_affected == 0 && model.status != to {
        return Err(TransitionError::Payslip { from: model.status, to }.into());
    }

    info!(payslip_id = %model.id, status = ?model.status, "Payslip status advanced");

    Ok(model)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sea_orm::{PaginatorTrait, TransactionTrait};

    use crate::{
        payroll::{self, MonthlyVariablesPayload, MonthInput, RateRegistry},
        testing,
    };

    use super::*;

    fn payload(employee_id: Uuid) -> MonthlyVariablesPayload {
        MonthlyVariablesPayload {
            employee_id: Some(employee_id),
            month: Some(MonthInput::Number(3)),
            year: Some(2025),
            status: Some(VariablesStatus::Submitted),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn test_employee_round_trip() {
        let db = testing::setup_db().await;
        let employee = testing::seed_employee(&db, dec!(20)).await;

        let found = find_employee(&db, employee.id).await.unwrap();
        assert_eq!(found, employee);
        assert_eq!(found.hourly_rate(), dec!(20));

        let missing = Uuid::new_v4();
        assert!(matches!(find_employee(&db, missing).await, Err(RepoError::EmployeeNotFound(id)) if id == missing));
    }

    #[actix_web::test]
    async fn test_upsert_is_idempotent() {
        let db = testing::setup_db().await;
        let employee = testing::seed_employee(&db, dec!(20)).await;

        let variables = payload(employee.id).validate().unwrap();

        let first = upsert_variables(&db, &variables).await.unwrap();
        let second = upsert_variables(&db, &variables).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.model.id, second.model.id);
        assert_eq!(MonthlyVariables::find().count(&db).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_resubmission_overwrites() {
        let db = testing::setup_db().await;
        let employee = testing::seed_employee(&db, dec!(20)).await;

        let draft = MonthlyVariablesPayload { status: Some(VariablesStatus::Draft), ..payload(employee.id) }
            .validate()
            .unwrap();
        let first = upsert_variables(&db, &draft).await.unwrap().model;

        let submitted = MonthlyVariablesPayload { overtime_hours: Some(dec!(6)), bonuses: Some(dec!(120.5)), ..payload(employee.id) }
            .validate()
            .unwrap();
        let second = upsert_variables(&db, &submitted).await.unwrap().model;

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, VariablesStatus::Submitted);
        assert_eq!(second.overtime_hours(), dec!(6));
        assert_eq!(second.bonuses(), dec!(120.50));
        assert_eq!(Variables::from(&second), submitted);

        // Other periods are separate records
        let april = MonthlyVariablesPayload { month: Some(MonthInput::Text("04".to_owned())), ..payload(employee.id) }
            .validate()
            .unwrap();
        upsert_variables(&db, &april).await.unwrap();
        assert_eq!(MonthlyVariables::find().count(&db).await.unwrap(), 2);
    }

    #[actix_web::test]
    async fn test_validated_period_is_locked() {
        let db = testing::setup_db().await;
        let employee = testing::seed_employee(&db, dec!(20)).await;

        let variables = payload(employee.id).validate().unwrap();
        let stored = upsert_variables(&db, &variables).await.unwrap().model;

        let validated = mark_variables_validated(&db, &stored).await.unwrap();
        assert_eq!(validated.status, VariablesStatus::Validated);

        // Re-validation is allowed, client re-submission is not
        let again = mark_variables_validated(&db, &validated).await.unwrap();
        assert_eq!(again.status, VariablesStatus::Validated);

        let err = upsert_variables(&db, &variables).await.unwrap_err();
        assert!(matches!(err, RepoError::Transition(TransitionError::Variables { from: VariablesStatus::Validated, .. })));
    }

    #[actix_web::test]
    async fn test_late_submission_leaves_validated_period_intact() {
        let db = testing::setup_db().await;
        let employee = testing::seed_employee(&db, dec!(20)).await;

        let stored = upsert_variables(&db, &payload(employee.id).validate().unwrap()).await.unwrap().model;

        // Validated between the client's read and its write
        let validated = mark_variables_validated(&db, &stored).await.unwrap();

        let late = MonthlyVariablesPayload { overtime_hours: Some(dec!(40)), bonuses: Some(dec!(900)), ..payload(employee.id) }
            .validate()
            .unwrap();
        let err = upsert_variables(&db, &late).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Transition(TransitionError::Variables { from: VariablesStatus::Validated, to: VariablesStatus::Submitted })
        ));

        let current = find_variables_by_id(&db, stored.id).await.unwrap();
        assert_eq!(current.status, VariablesStatus::Validated);
        assert_eq!(current.overtime_hours_hundredths, validated.overtime_hours_hundredths);
        assert_eq!(current.bonuses_cents, validated.bonuses_cents);
    }

    #[actix_web::test]
    async fn test_save_payslip_in_transaction() {
        let db = testing::setup_db().await;
        let employee = testing::seed_employee(&db, dec!(20)).await;
        let table = RateRegistry::builtin().for_year(2025).unwrap().clone();

        let stored = upsert_variables(&db, &payload(employee.id).validate().unwrap()).await.unwrap().model;

        let txn = db.begin().await.unwrap();
        let validated = mark_variables_validated(&txn, &stored).await.unwrap();
        let computation = payroll::compute_payslip(&Variables::from(&validated), employee.hourly_rate(), &table).unwrap();
        let saved = save_payslip(&txn, &validated, &computation).await.unwrap();
        txn.commit().await.unwrap();

        assert!(saved.created);
        assert_eq!(saved.model.gross_salary(), dec!(3033.40));
        assert_eq!(saved.model.net_salary(), dec!(2299.32));
        assert_eq!(saved.model.monthly_variables_id, stored.id);
        assert_eq!(saved.model.rate_year, 2025);
        assert_eq!(saved.model.status, PayslipStatus::Generated);

        // Regenerating overwrites the same record with identical figures
        let sent = advance_payslip(&db, &saved.model, PayslipStatus::Sent).await.unwrap();
        let regenerated = save_payslip(&db, &validated, &computation).await.unwrap();

        assert!(!regenerated.created);
        assert_eq!(regenerated.model.id, sent.id);
        assert_eq!(regenerated.model.gross_salary_cents, saved.model.gross_salary_cents);
        assert_eq!(regenerated.model.net_salary_cents, saved.model.net_salary_cents);
        assert_eq!(regenerated.model.status, PayslipStatus::Generated);
        assert_eq!(Payslip::find().count(&db).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_advance_payslip() {
        let db = testing::setup_db().await;
        let employee = testing::seed_employee(&db, dec!(20)).await;
        let table = RateRegistry::builtin().for_year(2025).unwrap().clone();

        let stored = upsert_variables(&db, &payload(employee.id).validate().unwrap()).await.unwrap().model;
        let validated = mark_variables_validated(&db, &stored).await.unwrap();
        let computation = payroll::compute_payslip(&Variables::from(&validated), employee.hourly_rate(), &table).unwrap();
        let generated = save_payslip(&db, &validated, &computation).await.unwrap().model;

        let sent = advance_payslip(&db, &generated, PayslipStatus::Sent).await.unwrap();
        assert_eq!(sent.status, PayslipStatus::Sent);

        let unchanged = advance_payslip(&db, &sent, PayslipStatus::Sent).await.unwrap();
        assert_eq!(unchanged, sent);

        let viewed = advance_payslip(&db, &sent, PayslipStatus::Viewed).await.unwrap();
        assert_eq!(viewed.status, PayslipStatus::Viewed);
        assert_eq!(find_payslip(&db, viewed.id).await.unwrap().status, PayslipStatus::Viewed);

        let err = advance_payslip(&db, &viewed, PayslipStatus::Sent).await.unwrap_err();
        assert!(matches!(err, RepoError::Transition(TransitionError::Payslip { .. })));

        // A stale copy still at `generated` cannot pull the stored status back
        let err = advance_payslip(&db, &generated, PayslipStatus::Sent).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Transition(TransitionError::Payslip { from: PayslipStatus::Viewed, to: PayslipStatus::Sent })
        ));
        assert_eq!(find_payslip(&db, generated.id).await.unwrap().status, PayslipStatus::Viewed);

        let already = advance_payslip(&db, &generated, PayslipStatus::Viewed).await.unwrap();
        assert_eq!(already.status, PayslipStatus::Viewed);
    }
}

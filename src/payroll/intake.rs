use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    consts::LEGAL_MONTHLY_HOURS,
    entity::{monthly_variables, sea_orm_active_enums::VariablesStatus},
    utils::{self, round_currency},
};

/// A payroll month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::MonthOutOfRange(month.to_string()));
        }

        Ok(Self { year, month })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Month as the entry screens send it, `3` or `"03"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthInput {
    Number(i64),
    Text(String),
}

impl MonthInput {
    pub fn parse(&self) -> Result<u32, ValidationError> {
        let out_of_range = || ValidationError::MonthOutOfRange(self.to_string());

        let month = match self {
            MonthInput::Number(n) => *n,
            MonthInput::Text(s) => s.trim().parse().map_err(|_| out_of_range())?,
        };

        match u32::try_from(month) {
            Ok(month @ 1..=12) => Ok(month),
            _ => Err(out_of_range()),
        }
    }
}

impl fmt::Display for MonthInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthInput::Number(n) => write!(f, "{n}"),
            MonthInput::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Raw monthly input, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyVariablesPayload {
    pub employee_id: Option<Uuid>,
    pub month: Option<MonthInput>,
    pub year: Option<i32>,
    pub hours_worked: Option<Decimal>,
    pub overtime_hours: Option<Decimal>,
    pub vacation_days: Option<i64>,
    pub sick_days: Option<i64>,
    pub bonuses: Option<Decimal>,
    pub status: Option<VariablesStatus>,
}

/// Validated monthly input. Hours and bonuses are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyVariables {
    pub employee_id: Uuid,
    pub period: Period,
    pub hours_worked: Decimal,
    pub overtime_hours: Decimal,
    pub vacation_days: u32,
    pub sick_days: u32,
    pub bonuses: Decimal,
    pub status: VariablesStatus,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`employeeId` is required")]
    MissingEmployee,

    #[error("`month` is required")]
    MissingMonth,

    #[error("`year` is required")]
    MissingYear,

    #[error("`month` must be between 01 and 12, got `{0}`")]
    MonthOutOfRange(String),

    #[error("`{0}` must not be negative")]
    NegativeField(&'static str),

    #[error("`{0}` is too large")]
    FieldTooLarge(&'static str),

    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("`hourlyRate` must be positive")]
    NonPositiveHourlyRate,

    #[error("`{0}` has more than two decimals")]
    TooPrecise(&'static str),

    #[error("variables cannot be submitted as `{0:?}`, only the payroll provider validates them")]
    StatusNotSubmittable(VariablesStatus),
}

impl MonthlyVariablesPayload {
    pub fn validate(self) -> Result<MonthlyVariables, ValidationError> {
        let employee_id = self.employee_id.ok_or(ValidationError::MissingEmployee)?;
        let month = self.month.as_ref().ok_or(ValidationError::MissingMonth)?.parse()?;
        let year = self.year.ok_or(ValidationError::MissingYear)?;

        let hours_worked = amount("hoursWorked", self.hours_worked.unwrap_or(LEGAL_MONTHLY_HOURS))?;
        let overtime_hours = amount("overtimeHours", self.overtime_hours.unwrap_or_default())?;
        let bonuses = amount("bonuses", self.bonuses.unwrap_or_default())?;
        let vacation_days = days("vacationDays", self.vacation_days.unwrap_or_default())?;
        let sick_days = days("sickDays", self.sick_days.unwrap_or_default())?;

        let status = match self.status.unwrap_or(VariablesStatus::Draft) {
            VariablesStatus::Validated => return Err(ValidationError::StatusNotSubmittable(VariablesStatus::Validated)),
            status => status,
        };

        Ok(MonthlyVariables {
            employee_id,
            period: Period::new(year, month)?,
            hours_worked,
            overtime_hours,
            vacation_days,
            sick_days,
            bonuses,
            status,
        })
    }
}

fn amount(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::NegativeField(field));
    }

    // Stored as hundredths
    if utils::to_hundredths(value).is_none() {
        return Err(ValidationError::FieldTooLarge(field));
    }

    Ok(round_currency(value))
}

/// Hourly rates are stored in cents, so they must already be whole cents.
pub fn validate_hourly_rate(hourly_rate: Decimal) -> Result<Decimal, ValidationError> {
    if hourly_rate.normalize().scale() > crate::consts::CURRENCY_SCALE {
        return Err(ValidationError::TooPrecise("hourlyRate"));
    }

    if hourly_rate <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveHourlyRate);
    }

    if utils::to_hundredths(hourly_rate).is_none() {
        return Err(ValidationError::FieldTooLarge("hourlyRate"));
    }

    Ok(hourly_rate)
}

fn days(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeField(field));
    }

    u32::try_from(value)
        .ok()
        .filter(|days| i32::try_from(*days).is_ok())
        .ok_or(ValidationError::FieldTooLarge(field))
}

impl From<&monthly_variables::Model> for MonthlyVariables {
    fn from(model: &monthly_variables::Model) -> Self {
        Self {
            employee_id: model.employee_id,
            period: Period {
                year: model.year,
                month: model.month.max(0) as u32,
            },
            hours_worked: model.hours_worked(),
            overtime_hours: model.overtime_hours(),
            vacation_days: model.vacation_days.max(0) as u32,
            sick_days: model.sick_days.max(0) as u32,
            bonuses: model.bonuses(),
            status: model.status,
        }
    }
}

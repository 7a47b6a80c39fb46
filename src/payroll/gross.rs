use rust_decimal::Decimal;
use serde::Serialize;

use crate::{consts::OVERTIME_MULTIPLIER, utils::{self, round_currency}};

use super::ComputationError;

/// Gross pay for one month. Components keep full precision, `gross_salary`
/// is rounded to the cent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrossBreakdown {
    pub hours_worked: Decimal,
    pub overtime_hours: Decimal,
    pub hourly_rate: Decimal,
    pub base_salary: Decimal,
    pub overtime_pay: Decimal,
    pub bonuses: Decimal,
    pub gross_salary: Decimal,
}

/// `None` when the product does not fit a `Decimal`
pub fn overtime_pay(overtime_hours: Decimal, hourly_rate: Decimal) -> Option<Decimal> {
    overtime_hours.checked_mul(hourly_rate)?.checked_mul(OVERTIME_MULTIPLIER)
}

pub fn compute_gross(
    hours_worked: Decimal,
    overtime_hours: Decimal,
    bonuses: Decimal,
    hourly_rate: Decimal,
) -> Result<GrossBreakdown, ComputationError> {
    if hourly_rate <= Decimal::ZERO {
        return Err(ComputationError::NonPositiveHourlyRate(hourly_rate));
    }

    for (field, value) in [("hoursWorked", hours_worked), ("overtimeHours", overtime_hours), ("bonuses", bonuses)] {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ComputationError::NegativeInput { field, value });
        }
    }

    let base_salary = hours_worked.checked_mul(hourly_rate)
        .ok_or(ComputationError::Overflow("baseSalary"))?;
    let overtime_pay = overtime_pay(overtime_hours, hourly_rate)
        .ok_or(ComputationError::Overflow("overtimePay"))?;
    let gross_salary = base_salary.checked_add(overtime_pay)
        .and_then(|sum| sum.checked_add(bonuses))
        .map(round_currency)
        .ok_or(ComputationError::Overflow("grossSalary"))?;

    // Everything downstream assumes a gross that fits in cents
    if utils::to_hundredths(gross_salary).is_none() {
        return Err(ComputationError::Overflow("grossSalary"));
    }

    Ok(GrossBreakdown {
        hours_worked,
        overtime_hours,
        hourly_rate,
        base_salary,
        overtime_pay,
        bonuses,
        gross_salary,
    })
}

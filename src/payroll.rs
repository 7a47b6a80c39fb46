//! Payroll calculation: monthly variables → gross → deductions → net.
//!
//! Everything here is pure. Storage and HTTP live in [`crate::repo`] and
//! [`crate::pages`].

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

mod deductions;
mod gross;
mod intake;
mod lifecycle;
mod rates;

pub use deductions::{compute_deductions, estimate_employer_cost, ContributionLine, DeductionBreakdown, DetailLevel, EmployerCostEstimate};
pub use gross::{compute_gross, overtime_pay, GrossBreakdown};
pub use intake::{validate_hourly_rate, MonthInput, MonthlyVariables, MonthlyVariablesPayload, Period, ValidationError};
pub use lifecycle::TransitionError;
pub use rates::{BaseKind, ContributionGroup, RateLine, RateRegistry, RateTable, RateTableError};

/// Inputs that validated intake can never produce. Seeing one means the data
/// was corrupted upstream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComputationError {
    #[error("hourly rate must be positive, got {0}")]
    NonPositiveHourlyRate(Decimal),

    #[error("`{field}` must not be negative, got {value}")]
    NegativeInput { field: &'static str, value: Decimal },

    #[error("employee rates of the {year} rate table sum to {sum}")]
    EmployeeRatesTooHigh { year: i32, sum: Decimal },

    #[error("`{0}` is too large to compute")]
    Overflow(&'static str),

    #[error("payslip `{payslip_id}` stores a net of {stored} but its inputs now give {computed}")]
    StoredFiguresMismatch { payslip_id: Uuid, stored: Decimal, computed: Decimal },
}

/// Everything needed to print a payslip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipComputation {
    pub rate_year: i32,
    pub gross: GrossBreakdown,
    pub deductions: DeductionBreakdown,
}

impl PayslipComputation {
    pub fn gross_salary(&self) -> Decimal {
        self.gross.gross_salary
    }

    pub fn net_salary(&self) -> Decimal {
        self.deductions.net_salary
    }
}

pub fn compute_payslip(variables: &MonthlyVariables, hourly_rate: Decimal, table: &RateTable) -> Result<PayslipComputation, ComputationError> {
    let gross = compute_gross(variables.hours_worked, variables.overtime_hours, variables.bonuses, hourly_rate)?;
    let deductions = compute_deductions(gross.gross_salary, table)?;

    Ok(PayslipComputation {
        rate_year: table.effective_year,
        gross,
        deductions,
    })
}

/// Quick preview shown while variables are being entered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub rate_year: i32,
    pub gross: GrossBreakdown,
    pub deductions: Vec<ContributionLine>,
    pub total_employee_deductions: Decimal,
    pub net_salary: Decimal,
    pub employer_estimate: EmployerCostEstimate,
}

pub fn preview(variables: &MonthlyVariables, hourly_rate: Decimal, table: &RateTable) -> Result<Preview, ComputationError> {
    let computation = compute_payslip(variables, hourly_rate, table)?;
    let gross_salary = computation.gross_salary();

    Ok(Preview {
        rate_year: computation.rate_year,
        deductions: computation.deductions.employee_lines(DetailLevel::Flat),
        total_employee_deductions: computation.deductions.total_employee_deductions,
        net_salary: computation.deductions.net_salary,
        employer_estimate: estimate_employer_cost(gross_salary),
        gross: computation.gross,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    use crate::entity::sea_orm_active_enums::VariablesStatus;

    fn variables(hours_worked: Decimal, overtime_hours: Decimal, bonuses: Decimal) -> MonthlyVariables {
        MonthlyVariables {
            employee_id: Uuid::new_v4(),
            period: Period { year: 2025, month: 6 },
            hours_worked,
            overtime_hours,
            vacation_days: 0,
            sick_days: 0,
            bonuses,
            status: VariablesStatus::Submitted,
        }
    }

    #[test]
    fn test_compute_payslip() {
        let table = RateRegistry::builtin().for_year(2025).unwrap().clone();

        let computation = compute_payslip(&variables(dec!(151.67), Decimal::ZERO, Decimal::ZERO), dec!(20), &table).unwrap();
        assert_eq!(computation.rate_year, 2025);
        assert_eq!(computation.gross_salary(), dec!(3033.40));
        assert_eq!(computation.net_salary(), dec!(2299.32));

        let computation = compute_payslip(&variables(dec!(151.67), dec!(10), dec!(200)), dec!(20), &table).unwrap();
        assert_eq!(computation.gross.overtime_pay, dec!(250.00));
        assert_eq!(computation.gross_salary(), dec!(3483.40));
        assert_eq!(computation.net_salary() + computation.deductions.total_employee_deductions, dec!(3483.40));
    }

    #[test]
    fn test_recompute_is_identical() {
        let table = RateTable::standard(2025, dec!(3925));
        let input = variables(dec!(148.25), dec!(7.5), dec!(312.40));

        assert_eq!(compute_payslip(&input, dec!(27.80), &table), compute_payslip(&input, dec!(27.80), &table));
    }

    #[test]
    fn test_preview_matches_payslip() {
        let table = RateTable::standard(2025, dec!(3925));
        let input = variables(dec!(151.67), dec!(12), dec!(450));

        let preview = preview(&input, dec!(31.20), &table).unwrap();
        let computation = compute_payslip(&input, dec!(31.20), &table).unwrap();

        assert_eq!(preview.net_salary, computation.net_salary());
        assert_eq!(preview.deductions.len(), 6);
        assert!(preview.employer_estimate.approximate);
        assert_ne!(preview.employer_estimate.estimated_charges, computation.deductions.employer_charges);
    }

    #[test]
    fn test_zero_rate_fails_fast() {
        let table = RateTable::standard(2025, dec!(3925));

        assert_eq!(
            compute_payslip(&variables(dec!(151.67), Decimal::ZERO, Decimal::ZERO), Decimal::ZERO, &table),
            Err(ComputationError::NonPositiveHourlyRate(Decimal::ZERO)),
        );
    }
}

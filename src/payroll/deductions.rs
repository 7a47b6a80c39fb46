use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{consts::FLAT_EMPLOYER_ESTIMATE_RATE, utils::round_currency};

use super::{
    rates::{BaseKind, ContributionGroup, RateLine, RateTable},
    ComputationError,
};

/// How finely contribution lines are reported.
///
/// Both levels sum the same line amounts, so they always agree on the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// One row per contribution group, used for quick previews.
    ///
    /// Group rates are effective rates over gross. Below the monthly ceiling
    /// they are the nominal group rates. Above it the capped lines make them
    /// smaller, so they are not the nominal rates applied to gross.
    Flat,
    /// Every rate line, as printed on the payslip document
    #[default]
    Detailed,
}

/// One printed line: `amount = base × rate`, kept at full precision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionLine {
    pub code: String,
    pub label: String,
    pub group: ContributionGroup,
    pub base_kind: BaseKind,
    pub base: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionBreakdown {
    pub gross_salary: Decimal,
    pub monthly_ceiling: Decimal,
    pub capped_base: Decimal,
    pub employee: Vec<ContributionLine>,
    pub employer: Vec<ContributionLine>,
    pub total_employee_deductions: Decimal,
    pub net_salary: Decimal,
    pub employer_charges: Decimal,
    pub total_employer_cost: Decimal,
}

impl DeductionBreakdown {
    pub fn employee_lines(&self, level: DetailLevel) -> Vec<ContributionLine> {
        project(&self.employee, self.gross_salary, level)
    }

    pub fn employer_lines(&self, level: DetailLevel) -> Vec<ContributionLine> {
        project(&self.employer, self.gross_salary, level)
    }
}

/// Employer cost at the flat preview rate. Not authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerCostEstimate {
    pub gross_salary: Decimal,
    pub rate: Decimal,
    pub estimated_charges: Decimal,
    pub estimated_total_cost: Decimal,
    /// Always `true`, so consumers cannot mistake it for the payslip figure
    pub approximate: bool,
}

pub fn estimate_employer_cost(gross_salary: Decimal) -> EmployerCostEstimate {
    let estimated_charges = round_currency(gross_salary * FLAT_EMPLOYER_ESTIMATE_RATE);

    EmployerCostEstimate {
        gross_salary,
        rate: FLAT_EMPLOYER_ESTIMATE_RATE,
        estimated_charges,
        estimated_total_cost: gross_salary + estimated_charges,
        approximate: true,
    }
}

pub fn compute_deductions(gross_salary: Decimal, table: &RateTable) -> Result<DeductionBreakdown, ComputationError> {
    if gross_salary.is_sign_negative() && !gross_salary.is_zero() {
        return Err(ComputationError::NegativeInput { field: "grossSalary", value: gross_salary });
    }

    let rate_sum = table.employee_rate_sum();
    if rate_sum >= Decimal::ONE {
        return Err(ComputationError::EmployeeRatesTooHigh { year: table.effective_year, sum: rate_sum });
    }

    let capped_base = table.capped_base(gross_salary);
    let apply = |lines: &[RateLine]| -> Vec<ContributionLine> {
        lines.iter().map(|line| {
            let base = match line.base {
                BaseKind::Gross => gross_salary,
                BaseKind::Capped => capped_base,
            };

            ContributionLine {
                code: line.code.clone(),
                label: line.label.clone(),
                group: line.group,
                base_kind: line.base,
                base,
                rate: line.rate,
                amount: base * line.rate,
            }
        }).collect()
    };

    let employee = apply(&table.employee);
    let employer = apply(&table.employer);

    let total_employee_deductions = round_currency(employee.iter().map(|line| line.amount).sum());
    let employer_charges = round_currency(employer.iter().map(|line| line.amount).sum());

    Ok(DeductionBreakdown {
        gross_salary,
        monthly_ceiling: table.monthly_ceiling,
        capped_base,
        employee,
        employer,
        total_employee_deductions,
        net_salary: gross_salary - total_employee_deductions,
        employer_charges,
        total_employer_cost: gross_salary + employer_charges,
    })
}

fn project(lines: &[ContributionLine], gross_salary: Decimal, level: DetailLevel) -> Vec<ContributionLine> {
    if level == DetailLevel::Detailed {
        return lines.to_vec();
    }

    let mut groups: Vec<(ContributionGroup, Decimal, Decimal)> = Vec::new();
    for line in lines {
        match groups.iter_mut().find(|(group, _, _)| *group == line.group) {
            Some((_, rate, amount)) => {
                *rate += line.rate;
                *amount += line.amount;
            }
            None => groups.push((line.group, line.rate, line.amount)),
        }
    }

    groups.into_iter().map(|(group, nominal_rate, amount)| {
        // Capped lines make the group rate drift below nominal above the ceiling
        let rate = if gross_salary.is_zero() {
            nominal_rate
        } else {
            (amount / gross_salary).round_dp(6).normalize()
        };

        ContributionLine {
            code: group.code().to_owned(),
            label: group.label().to_owned(),
            group,
            base_kind: BaseKind::Gross,
            base: gross_salary,
            rate,
            amount,
        }
    }).collect()
}

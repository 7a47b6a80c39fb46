use thiserror::Error;

use crate::entity::sea_orm_active_enums::{PayslipStatus, VariablesStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("monthly variables cannot go from `{from:?}` to `{to:?}`")]
    Variables { from: VariablesStatus, to: VariablesStatus },

    #[error("payslip cannot go back from `{from:?}` to `{to:?}`")]
    Payslip { from: PayslipStatus, to: PayslipStatus },
}

impl VariablesStatus {
    /// Once validated, a period only accepts re-validation by the provider.
    pub fn transition_to(self, to: VariablesStatus) -> Result<VariablesStatus, TransitionError> {
        match (self, to) {
            (VariablesStatus::Validated, VariablesStatus::Validated) => Ok(to),
            (VariablesStatus::Validated, _) => Err(TransitionError::Variables { from: self, to }),
            _ => Ok(to),
        }
    }
}

impl PayslipStatus {
    /// `generated → sent → viewed`. Staying put is a no-op.
    pub fn advance_to(self, to: PayslipStatus) -> Result<PayslipStatus, TransitionError> {
        if to < self {
            return Err(TransitionError::Payslip { from: self, to });
        }

        Ok(to)
    }
}

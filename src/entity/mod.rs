//! SeaORM entities, one module per table.

pub mod prelude;

pub mod employee;
pub mod monthly_variables;
pub mod payslip;
pub mod sea_orm_active_enums;

pub use super::employee::Entity as Employee;
pub use super::monthly_variables::Entity as MonthlyVariables;
pub use super::payslip::Entity as Payslip;

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PayslipStatus;
use crate::utils;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payslip")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub employee_id: Uuid,
    pub month: i16,
    pub year: i32,
    pub monthly_variables_id: Uuid,
    pub gross_salary_cents: i64,
    pub net_salary_cents: i64,
    /// Effective year of the rate table the figures were computed with
    pub rate_year: i32,
    pub status: PayslipStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::monthly_variables::Entity",
        from = "Column::MonthlyVariablesId",
        to = "super::monthly_variables::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    MonthlyVariables,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::monthly_variables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyVariables.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn gross_salary(&self) -> Decimal {
        utils::from_hundredths(self.gross_salary_cents)
    }

    pub fn net_salary(&self) -> Decimal {
        utils::from_hundredths(self.net_salary_cents)
    }
}

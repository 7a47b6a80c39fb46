use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VariablesStatus;
use crate::utils;

/// Hours are stored in hundredths of an hour, bonuses in cents.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_variables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub employee_id: Uuid,
    pub month: i16,
    pub year: i32,
    pub hours_worked_hundredths: i64,
    pub overtime_hours_hundredths: i64,
    pub vacation_days: i32,
    pub sick_days: i32,
    pub bonuses_cents: i64,
    pub status: VariablesStatus,
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
    #[sea_orm(has_one = "super::payslip::Entity")]
    Payslip,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::payslip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payslip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn hours_worked(&self) -> Decimal {
        utils::from_hundredths(self.hours_worked_hundredths)
    }

    pub fn overtime_hours(&self) -> Decimal {
        utils::from_hundredths(self.overtime_hours_hundredths)
    }

    pub fn bonuses(&self) -> Decimal {
        utils::from_hundredths(self.bonuses_cents)
    }
}

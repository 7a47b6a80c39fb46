use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Text")]
    pub full_name: String,
    pub hourly_rate_cents: i64,
    pub employer_company_id: Uuid,
    pub client_company_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::monthly_variables::Entity")]
    MonthlyVariables,
    #[sea_orm(has_many = "super::payslip::Entity")]
    Payslip,
}

impl Related<super::monthly_variables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyVariables.def()
    }
}

impl Related<super::payslip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payslip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Euro per hour
    pub fn hourly_rate(&self) -> Decimal {
        utils::from_hundredths(self.hourly_rate_cents)
    }
}

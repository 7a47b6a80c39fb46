use sea_orm_migration::prelude::*;

use crate::util::{create_period_index, default_table_statement, period_table_statement, DefaultColumn};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(default_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::FullName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::HourlyRateCents)
                    .big_integer()
                    .not_null()) // Euro cents per hour, always > 0
                .col(ColumnDef::new(Employee::EmployerCompanyId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Employee::ClientCompanyId)
                    .uuid()
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(period_table_statement(MonthlyVariables::Table)
                .col(ColumnDef::new(MonthlyVariables::HoursWorkedHundredths)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(MonthlyVariables::OvertimeHoursHundredths)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(MonthlyVariables::VacationDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(MonthlyVariables::SickDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(MonthlyVariables::BonusesCents)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(MonthlyVariables::Status)
                    .string_len(16)
                    .not_null())
                .take()
            ).await?;
        create_period_index(manager, MonthlyVariables::Table, "idx_monthly_variables_period").await?;

        manager
            .create_table(period_table_statement(Payslip::Table)
                .col(ColumnDef::new(Payslip::MonthlyVariablesId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Payslip::GrossSalaryCents)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::NetSalaryCents)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::RateYear)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::Status)
                    .string_len(16)
                    .not_null())
                .foreign_key(ForeignKey::create()
                    .from(Payslip::Table, Payslip::MonthlyVariablesId)
                    .to(MonthlyVariables::Table, DefaultColumn::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade))
                .take()
            ).await?;
        create_period_index(manager, Payslip::Table, "idx_payslip_period").await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(
            TableDropStatement::new()
                .table(Payslip::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(MonthlyVariables::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(Employee::Table)
                .take()
        ).await?;

        Ok(())
    }
}

#[derive(DeriveIden, Clone)]
pub(crate) enum Employee {
    Table,
    FullName,
    HourlyRateCents,
    EmployerCompanyId,
    ClientCompanyId,
}

#[derive(DeriveIden, Clone)]
enum MonthlyVariables {
    Table,
    HoursWorkedHundredths,
    OvertimeHoursHundredths,
    VacationDays,
    SickDays,
    BonusesCents,
    Status,
}

#[derive(DeriveIden, Clone)]
enum Payslip {
    Table,
    MonthlyVariablesId,
    GrossSalaryCents,
    NetSalaryCents,
    RateYear,
    Status,
}

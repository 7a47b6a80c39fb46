use sea_orm_migration::prelude::*;

use crate::m20250701_000001_init::Employee;

/// Id and audit timestamps shared by every table.
///
/// Ids are generated by the service, so the column carries no database default
/// and the same statement works on PostgreSQL and SQLite.
pub(crate) fn default_table_statement() -> TableCreateStatement {
    TableCreateStatement::new()
        .if_not_exists()
        .col(ColumnDef::new(DefaultColumn::Id)
            .uuid()
            .not_null()
            .primary_key()
            .take())
        .col(ColumnDef::new(DefaultColumn::CreatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .take())
        .col(ColumnDef::new(DefaultColumn::UpdatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .take())
        .take()
}

#[derive(DeriveIden)]
pub(crate) enum DefaultColumn {
    Id,
    CreatedAt,
    UpdatedAt,
}

/// Adds the `(employee_id, month, year)` columns of a per-period table and
/// its foreign key to `employee`.
///
/// # Example
///
/// ```rs
/// manager
///     .create_table(period_table_statement(Payslip::Table)
///         .col(ColumnDef::new(Payslip::GrossSalaryCents)
///             .big_integer()
///             .not_null())
///         .take()
///     ).await?;
/// create_period_index(manager, Payslip::Table, "idx_payslip_period").await?;
/// ```
pub(crate) fn period_table_statement<T: IntoIden + Clone + 'static>(table: T) -> TableCreateStatement {
    default_table_statement()
        .table(table.clone())
        .col(ColumnDef::new(PeriodColumn::EmployeeId)
            .uuid()
            .not_null())
        .col(ColumnDef::new(PeriodColumn::Month)
            .small_integer()
            .not_null())
        .col(ColumnDef::new(PeriodColumn::Year)
            .integer()
            .not_null())
        .foreign_key(ForeignKey::create()
            .from(table, PeriodColumn::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .on_update(ForeignKeyAction::Cascade))
        .take()
}

/// At most one row per employee and period; upserts target this index.
pub(crate) async fn create_period_index<T: IntoIden + 'static>(manager: &SchemaManager<'_>, table: T, name: &str) -> Result<(), DbErr> {
    manager
        .create_index(Index::create()
            .name(name)
            .table(table)
            .col(PeriodColumn::EmployeeId)
            .col(PeriodColumn::Year)
            .col(PeriodColumn::Month)
            .unique()
            .to_owned()
        ).await
}

#[derive(DeriveIden)]
pub(crate) enum PeriodColumn {
    EmployeeId,
    Month,
    Year,
}

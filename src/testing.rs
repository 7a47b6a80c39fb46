use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

use crate::{entity::employee, repo::{self, NewEmployee}};

/// Fresh in-memory database with the schema applied
pub(crate) async fn setup_db() -> DatabaseConnection {
    // One connection, otherwise every pooled connection gets its own database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    db
}

pub(crate) async fn seed_employee(db: &DatabaseConnection, hourly_rate: Decimal) -> employee::Model {
    repo::insert_employee(db, NewEmployee {
        full_name: "Camille Martin".to_string(),
        hourly_rate,
        employer_company_id: Uuid::new_v4(),
        client_company_id: Uuid::new_v4(),
    }).await.unwrap()
}

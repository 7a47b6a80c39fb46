use std::{fs::OpenOptions, io};

use actix_web::{web, App, HttpServer};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use portage_payroll::{config, pages, payroll::RateRegistry};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(config::load_trace_log_path())?;

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_line_number(true)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_file)
                .with_filter(filter::LevelFilter::from_level(Level::TRACE))
        );

    tracing::subscriber::set_global_default(subscriber).map_err(io::Error::other)?;

    let config::Config {
        host_address,
        database_opt,
        rate_tables_path,
        run_migrations,
    } = config::load().map_err(io::Error::other)?;

    let database = Database::connect(database_opt).await.map_err(io::Error::other)?;

    if run_migrations {
        info!("Applying pending migrations");
        Migrator::up(&database, None).await.map_err(io::Error::other)?;
    }

    let mut rates = RateRegistry::builtin();
    if let Some(path) = rate_tables_path {
        rates.load_json(&path).map_err(io::Error::other)?;
    }
    info!(years = ?rates.years().collect::<Vec<_>>(), "Rate tables ready");

    let database = web::Data::new(database);
    let rates = web::Data::new(rates);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(database.clone())
            .app_data(rates.clone())
            .wrap(TracingLogger::default())
            .configure(pages::config)
    });

    let server = server.bind(host_address)?;
    for address in server.addrs() {
        info!(%address, "Listening");
    }

    server.run().await
}

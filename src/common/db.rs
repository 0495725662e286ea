use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

/// Open the SQLite database and bring its schema up to date.
///
/// In-memory databases are limited to one pooled connection, since every
/// SQLite connection to `:memory:` opens a separate, empty database.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    tracing::debug!(url = %database_url, "Database connection established");

    migration::Migrator::up(&db, None).await?;
    tracing::debug!("Migrations completed");

    Ok(db)
}

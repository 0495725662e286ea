//! sea-orm migration CLI for the greenhouse database.
//!
//! Reads `DATABASE_URL` (or `-u`) like the server, e.g.
//! `DATABASE_URL=sqlite://invernaderos.db?mode=rwc migration up`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let url_flag = std::env::args().any(|a| a == "-u" || a.starts_with("--database-url"));
    if std::env::var("DATABASE_URL").is_err() && !url_flag {
        eprintln!("DATABASE_URL not set; the server default is sqlite://invernaderos.db?mode=rwc");
    }
    cli::run_cli(migration::Migrator).await;
}

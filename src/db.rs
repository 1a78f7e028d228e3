use rocket_db_pools::{Database, sqlx};

#[derive(Database)]
#[database("campaign_db")]
pub struct CampaignDb(sqlx::PgPool);

/// Embedded schema migrations, shared by the startup fairing and the
/// test database factory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

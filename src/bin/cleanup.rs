//! Deletes incomplete registrations that have outlived the retention window.
//! Meant to run on a schedule (cron or similar).

use passo_api::{config::AppConfig, db::create_orm_conn, services::auth_service};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    let purged =
        auth_service::purge_stale_registrations(&orm, config.registration_retention_hours).await?;
    println!(
        "Purged {purged} stale registrations (older than {} hours)",
        config.registration_retention_hours
    );
    Ok(())
}

#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Run migrations only once across the entire test process; remember a failed
// attempt so every test skips quickly when no database is reachable.
static MIGRATED: OnceCell<Result<(), String>> = OnceCell::const_new();

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let ready = MIGRATED
        .get_or_init(|| async {
            let db = match models::db::connect().await {
                Ok(db) => db,
                Err(e) => return Err(e.to_string()),
            };
            if let Err(e) = migration::Migrator::up(&db, None).await {
                return Err(e.to_string());
            }
            Ok(())
        })
        .await;
    if let Err(e) = ready {
        anyhow::bail!("database unavailable: {}", e);
    }

    // Fresh connection for the current test's runtime
    models::db::connect().await
}

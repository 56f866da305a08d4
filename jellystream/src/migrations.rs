use anyhow::Result;
use sqlx::PgPool;
use tracing::{error, info};

/// Run pending migrations. JellyStream runs single-node, so unlike a
/// clustered deployment there is no need for a distributed lock here.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("running database migrations");
    sqlx::migrate!("migrations").run(pool).await.map_err(|e| {
        error!(error = %e, "failed to run migrations");
        anyhow::anyhow!("migration failed: {e}")
    })?;
    info!("migrations complete");
    Ok(())
}

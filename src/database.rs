use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = Self::pool_options(pool_size)
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    /// Пул без подключения: соединения открываются при первом запросе.
    pub fn connect_lazy(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = Self::pool_options(pool_size).connect_lazy(database_url)?;
        Ok(Database { pool })
    }

    fn pool_options(pool_size: u32) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed");
        Ok(())
    }
}

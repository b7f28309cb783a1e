use crate::config::StoreConfig;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;

#[derive(Clone)]
pub struct Db(pub AnyPool);

impl Db {
    /// Opens a pool for the configured driver. The schema is expected to
    /// exist already.
    pub async fn connect(cfg: &StoreConfig) -> anyhow::Result<Self> {
        sqlx::any::install_default_drivers();
        let url = database_url(cfg)?;
        log::info!(
            "connecting to {} database {:?} at {}:{}",
            cfg.driver,
            cfg.name,
            cfg.host,
            cfg.port
        );

        let pool = AnyPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect(&url)
            .await?;
        Ok(Db(pool))
    }
}

pub fn database_url(cfg: &StoreConfig) -> anyhow::Result<String> {
    match cfg.driver.as_str() {
        "mysql" => Ok(format!(
            "mysql://{}:{}@{}:{}/{}",
            cfg.user, cfg.password, cfg.host, cfg.port, cfg.name
        )),
        "sqlite" if cfg.name == ":memory:" => Ok("sqlite::memory:".to_string()),
        "sqlite" => Ok(format!("sqlite://{}?mode=rwc", cfg.name)),
        other => anyhow::bail!("unsupported database driver: {other}"),
    }
}

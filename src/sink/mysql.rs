use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::SinkError;
use crate::models::{SizeRecord, UpdateOutcome};

/// Writes sizes into `<table>.disk_size` on a MySQL/MariaDB server.
pub struct MySqlSink {
    pool: MySqlPool,
    statement: String,
}

impl MySqlSink {
    /// Open a connection pool. Fails if the server cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, SinkError> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            table = %config.table,
            "connected to database"
        );

        Ok(Self {
            pool,
            statement: update_statement(&config.table),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// `table` must already be validated as a plain identifier.
fn update_statement(table: &str) -> String {
    format!(
        "UPDATE `{}` SET disk_size = ? WHERE group_id = ? AND artifact_id = ? AND version = ?",
        table
    )
}

impl super::MetadataSink for MySqlSink {
    async fn update(&self, record: &SizeRecord) -> Result<UpdateOutcome, SinkError> {
        let c = &record.coordinate;
        let result = sqlx::query(&self.statement)
            .bind(record.size_bytes)
            .bind(&c.group_id)
            .bind(&c.artifact_id)
            .bind(&c.version)
            .execute(&self.pool)
            .await?;

        // sqlx negotiates CLIENT_FOUND_ROWS, so this counts matched rows and an
        // unchanged size still reports 1.
        let rows = result.rows_affected();
        debug!(coordinate = %c, rows, "update executed");

        Ok(if rows == 0 {
            UpdateOutcome::NotFound
        } else {
            UpdateOutcome::Applied { rows }
        })
    }
}

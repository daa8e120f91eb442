//! Database module providing connection management and queries.

pub mod deploy_events;
pub mod deploy_projects;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::AppResult;

/// Database connection wrapper shared across handlers and services.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to PostgreSQL.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options.max_connections(10).sqlx_logging(false);

        let conn = Database::connect(options).await?;
        Ok(DbPool { conn })
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        DbPool { conn }
    }

    /// Get access to the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}

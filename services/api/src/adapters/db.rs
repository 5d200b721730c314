//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `AnchorStore` port from the `core` crate. It keeps countdown anchors in
//! PostgreSQL using `sqlx`.

use academy_core::ports::{AnchorStore, PortError, PortResult};
use async_trait::async_trait;
use sqlx::PgPool;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `AnchorStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Connection-level failures are transient; everything else is a bug or bad data.
fn to_port_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            PortError::Unavailable(e.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `AnchorStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnchorStore for DbAdapter {
    async fn load_anchor(&self, namespace: &str) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT anchor FROM countdown_anchors WHERE namespace = $1")
            .bind(namespace)
            .fetch_optional(&self.pool)
            .await
            .map_err(to_port_error)
    }

    async fn save_anchor(&self, namespace: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO countdown_anchors (namespace, anchor, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (namespace) DO UPDATE SET anchor = EXCLUDED.anchor, updated_at = NOW()",
        )
        .bind(namespace)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(to_port_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_map_to_unavailable() {
        for e in [
            sqlx::Error::PoolTimedOut,
            sqlx::Error::PoolClosed,
            sqlx::Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ] {
            assert!(matches!(to_port_error(e), PortError::Unavailable(_)));
        }
    }

    #[test]
    fn other_failures_map_to_unexpected() {
        let e = to_port_error(sqlx::Error::RowNotFound);
        assert!(matches!(e, PortError::Unexpected(_)));
        let e = to_port_error(sqlx::Error::ColumnNotFound("anchor".to_string()));
        assert!(matches!(e, PortError::Unexpected(_)));
    }
}

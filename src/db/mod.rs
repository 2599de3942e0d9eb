use crate::domain::{CaseId, OrderId};
use crate::entities::{cases, orders};
use crate::models::{CaseRecord, HistoryPage, SearchStats};
use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::cases::{NewSearch, format_timestamp};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path) = sqlite_file_path(db_url) {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
            if !path.exists() {
                std::fs::File::create(path)
                    .with_context(|| format!("Failed to create database file {}", path.display()))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn case_repo(&self) -> repositories::cases::CaseRepository {
        repositories::cases::CaseRepository::new(self.conn.clone())
    }

    fn order_repo(&self) -> repositories::orders::OrderRepository {
        repositories::orders::OrderRepository::new(self.conn.clone())
    }

    pub async fn insert_search(&self, search: NewSearch<'_>) -> Result<CaseId, DbErr> {
        self.case_repo().insert_search(search).await
    }

    pub async fn get_case(&self, id: CaseId) -> Result<Option<cases::Model>, DbErr> {
        self.case_repo().get(id).await
    }

    pub async fn get_case_record(&self, id: CaseId) -> Result<Option<CaseRecord>, DbErr> {
        self.case_repo().get_record(id).await
    }

    pub async fn latest_case_by_number(
        &self,
        case_number: &str,
    ) -> Result<Option<CaseRecord>, DbErr> {
        self.case_repo().latest_by_case_number(case_number).await
    }

    pub async fn case_history(&self, page: u64, per_page: u64) -> Result<HistoryPage, DbErr> {
        self.case_repo().history(page, per_page).await
    }

    pub async fn recent_cases(&self, limit: u64) -> Result<Vec<cases::Model>, DbErr> {
        self.case_repo().recent(limit).await
    }

    pub async fn search_stats(&self) -> Result<SearchStats, DbErr> {
        self.case_repo().stats().await
    }

    pub async fn count_cases(&self) -> Result<u64, DbErr> {
        self.case_repo().count().await
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Option<orders::Model>, DbErr> {
        self.order_repo().get(id).await
    }

    pub async fn get_order_with_case(
        &self,
        id: OrderId,
    ) -> Result<Option<(orders::Model, cases::Model)>, DbErr> {
        self.order_repo().get_with_case(id).await
    }

    pub async fn set_order_local_path(&self, id: OrderId, path: &str) -> Result<(), DbErr> {
        self.order_repo().set_local_path(id, path).await
    }

    pub async fn count_orders(&self) -> Result<u64, DbErr> {
        self.order_repo().count().await
    }
}

/// The on-disk file behind a `sqlite:` URL, or `None` for in-memory databases.
fn sqlite_file_path(db_url: &str) -> Option<&Path> {
    let rest = db_url.strip_prefix("sqlite:").unwrap_or(db_url);
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite:data/court_data.db"),
            Some(Path::new("data/court_data.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite:///tmp/a.db?mode=rwc"),
            Some(Path::new("/tmp/a.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
    }

    #[tokio::test]
    async fn test_unusable_database_directory_is_reported() {
        let blocker = std::env::temp_dir().join(format!("court-fetcher-blocker-{}", uuid::Uuid::new_v4()));
        std::fs::write(&blocker, b"not a directory").unwrap();

        let url = format!("sqlite:{}", blocker.join("nested").join("cases.db").display());
        let err = Store::new(&url).await.err().expect("directory under a file must fail");
        assert!(
            err.to_string().starts_with("Failed to create database directory"),
            "{err:#}"
        );

        std::fs::remove_file(&blocker).ok();
    }
}

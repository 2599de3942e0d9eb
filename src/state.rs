use std::sync::Arc;

use crate::clients::{CaseSource, CourtClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{CaseService, PdfService, SeaOrmCaseService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub court: Arc<dyn CaseSource>,

    pub case_service: Arc<dyn CaseService>,

    pub pdf_service: Arc<PdfService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let court = Arc::new(CourtClient::new(&config.scraper)?) as Arc<dyn CaseSource>;
        Self::with_source(config, court).await
    }

    /// Builds the state around a given case source.
    pub async fn with_source(config: Config, court: Arc<dyn CaseSource>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let case_service = Arc::new(SeaOrmCaseService::new(
            store.clone(),
            court.clone(),
            config.scraper.case_types.clone(),
        )) as Arc<dyn CaseService>;

        let pdf_service = Arc::new(PdfService::new(
            store.clone(),
            court.clone(),
            &config.general.downloads_path,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            court,
            case_service,
            pdf_service,
        })
    }
}

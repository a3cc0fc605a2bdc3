pub mod auth;
pub mod common;
pub mod courses;
pub mod financial;
pub mod health;
pub mod progress;
pub mod records;

use crate::{
    config::AppConfig,
    db::DbPool,
    errors::ServiceError,
    services::{
        financial::FinancialService, records::RecordService, users::UserService,
        video_catalog::VideoCatalogClient,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub records: Arc<RecordService>,
    pub financial: Arc<FinancialService>,
    pub users: Arc<UserService>,
    pub video_catalog: Arc<VideoCatalogClient>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            records: Arc::new(RecordService::new(db_pool.clone())),
            financial: Arc::new(FinancialService::new(db_pool.clone())),
            users: Arc::new(UserService::new(db_pool)),
            video_catalog: Arc::new(VideoCatalogClient::from_config(config)?),
        })
    }
}

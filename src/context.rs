use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{TicketStore, UserDirectoryService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn TicketStore>,
    pub directory: Arc<dyn UserDirectoryService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn TicketStore>,
        directory: Arc<dyn UserDirectoryService>,
    ) -> Self {
        Self {
            config,
            store,
            directory,
        }
    }
}

use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

const DEFAULT_DIRECTORY_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    pub database_path: String,
    pub directory_base_url: String,
    pub directory_timeout: Duration,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let listen_addr =
            env::var("TICKETD_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
        let database_path =
            env::var("TICKETD_DATABASE_PATH").unwrap_or_else(|_| "ticketd.db".to_string());
        let directory_base_url = env::var("TICKETD_DIRECTORY_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:9000".to_string());
        let directory_timeout =
            parse_timeout_secs(env::var("TICKETD_DIRECTORY_TIMEOUT_SECS").ok())?;

        Ok(Self {
            listen_addr,
            database_path,
            directory_base_url,
            directory_timeout,
        })
    }
}

fn parse_timeout_secs(raw: Option<String>) -> AppResult<Duration> {
    match raw {
        None => Ok(Duration::from_secs(DEFAULT_DIRECTORY_TIMEOUT_SECS)),
        Some(value) => {
            let secs: u64 = value.trim().parse().map_err(|_| {
                AppError::Configuration(format!(
                    "invalid TICKETD_DIRECTORY_TIMEOUT_SECS: {value}"
                ))
            })?;
            Ok(Duration::from_secs(secs))
        }
    }
}

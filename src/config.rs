use std::env;
use std::path::PathBuf;

use crate::analysis::DEFAULT_RANKING_SIZE;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_upload_mb: usize,
    pub ranking_size: usize,
    /// Workbook loaded at startup, if any
    pub workbook_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            max_upload_mb: env::var("MAX_UPLOAD_MB")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            ranking_size: env::var("RANKING_SIZE")
                .unwrap_or_else(|_| DEFAULT_RANKING_SIZE.to_string())
                .parse()
                .unwrap_or(DEFAULT_RANKING_SIZE),
            workbook_path: optional_var("WORKBOOK_PATH")?.map(PathBuf::from),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Unset or empty variables are `None`; non-unicode values are an error
fn optional_var(key: &str) -> Result<Option<String>, env::VarError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e),
    }
}

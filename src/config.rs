use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct SftpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl SftpConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("SFTP_HOST").context("SFTP_HOST not set")?;
        let port = match std::env::var("SFTP_PORT") {
            Ok(raw) => raw.parse::<u16>().context("SFTP_PORT is not a valid port")?,
            Err(_) => 22,
        };
        let username = std::env::var("SFTP_USERNAME").context("SFTP_USERNAME not set")?;
        let password = std::env::var("SFTP_PASSWORD").context("SFTP_PASSWORD not set")?;

        Ok(Self {
            host,
            port,
            username,
            password,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl AdminConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let password = std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD not set")?;

        Ok(Self { username, password })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub sftp: SftpConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            sftp: SftpConfig::from_env()?,
            admin: AdminConfig::from_env()?,
        })
    }
}

use std::path::PathBuf;

use crate::error::Result;
pub use clap::Parser;
use movies_app::state::AppConfig;
use time::{macros::format_description, Date};
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "MOVIES_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "MOVIES_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "MOVIES_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server, as visible to clients"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "MOVIES_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/movies.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "MOVIES_DATA_DIR",
        help = "Data directory (database etc.), default is system default like ~/.local/share/movies",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "MOVIES_DEFAULT_PAGE_SIZE",
        default_value = "100",
        value_parser = clap::value_parser!(u32).range(1..=1000),
        help = "Default page size (1-1000)"
    )]
    pub default_page_size: u32,

    #[arg(long, env = "MOVIES_CORS", help = "Enable permissive CORS")]
    pub cors: bool,

    #[arg(
        long,
        env = "MOVIES_TODAY",
        help = "Use fixed date (YYYY-MM-DD) instead of current date when validating release dates",
        value_parser = parse_date
    )]
    pub today: Option<Date>,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("movies"))
        .unwrap_or_else(|| PathBuf::from("movies"))
        .to_string_lossy()
        .to_string()
}

fn parse_date(s: &str) -> std::result::Result<Date, time::error::Parse> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/movies.db", self.data_dir))
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            default_page_size: config.default_page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn test_defaults() {
        let config =
            ServerConfig::try_parse_from(["movies-server", "--data-dir", "/tmp/movies-test"])
                .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_address, "127.0.0.1");
        assert_eq!(config.database_url(), "sqlite:///tmp/movies-test/movies.db");
        assert_eq!(config.default_page_size, 100);
        assert!(!config.cors);
        assert!(config.today.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::try_parse_from([
            "movies-server",
            "--port",
            "8080",
            "--database-url",
            "sqlite::memory:",
            "--today",
            "2024-06-15",
            "--cors",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.today, Some(date!(2024 - 06 - 15)));
        assert!(config.cors);
        assert_eq!(AppConfig::from(&config).default_page_size, 100);
    }

    #[test]
    fn test_default_page_size_range() {
        for size in ["0", "1001", "-5"] {
            let res = ServerConfig::try_parse_from(["movies-server", "--default-page-size", size]);
            assert!(res.is_err(), "page size {size} accepted");
        }
        let config =
            ServerConfig::try_parse_from(["movies-server", "--default-page-size", "1000"]).unwrap();
        assert_eq!(config.default_page_size, 1000);
    }

    #[test]
    fn test_invalid_today() {
        let res = ServerConfig::try_parse_from(["movies-server", "--today", "15.6.2024"]);
        assert!(res.is_err());
    }
}

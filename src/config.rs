// ⚙️ Server configuration
// CLI flags with environment fallbacks; a .env file is honoured when present

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "swift_codes.db";
pub const DEFAULT_DATA_FILE: &str = "data/Interns_2025_SWIFT_CODES.xlsx";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// SWIFT code registry HTTP server
#[derive(Parser, Debug, Clone)]
#[command(name = "swift-server")]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// SQLite database file
    #[arg(long = "db", env = "SWIFT_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Spreadsheet (.xlsx or .csv) preloaded at startup (skipped when absent)
    #[arg(long = "data", env = "SWIFT_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Listen address
    #[arg(long = "bind", env = "SWIFT_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: SocketAddr,

    /// Do not preload the data file
    #[arg(long, env = "SWIFT_SKIP_IMPORT")]
    pub skip_import: bool,
}

impl ServerConfig {
    /// Load `.env` (if any), then parse flags and environment
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        ServerConfig::parse()
    }
}

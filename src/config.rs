use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "recommender-proxy")]
#[command(about = "Region query proxy for tabix lookups and the recommender script")]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "PROXY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "9002")]
    pub port: u16,

    /// Maximum number of bytes accepted from a lookup before the request is rejected
    #[arg(long, env = "BYTELIMIT", default_value = "1048576")]
    pub byte_limit: usize,

    /// Path to the tabix binary
    #[arg(long, env = "TABIX_BIN", default_value = "/usr/bin/tabix")]
    pub tabix_bin: PathBuf,

    /// Path to the recommender script
    #[arg(long, env = "RECOMMENDER_SCRIPT", default_value = "./recommender.py")]
    pub recommender_script: PathBuf,

    /// Root of the per-dataset working directories (tabix drops .tbi files here)
    #[arg(long, env = "PROXY_WORK_DIR", default_value = "/tmp")]
    pub work_dir: PathBuf,

    /// Enable CORS, mirroring the request origin
    #[arg(long, env = "PROXY_CORS", default_value = "true", action = ArgAction::Set)]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

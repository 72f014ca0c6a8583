use clap::{Parser, ValueEnum};
use forwarder::upstream::DEFAULT_BASE_URL;
use forwarder::{ConfigError, UpstreamConfig};
use logging::LogMode;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "n8n-mcp-server", version, about, long_about = None)]
pub struct ServerArgs {
    // Port to listen on (ignored when --socket is given)
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    // Interface to bind the TCP listener to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    // Unix socket path to listen on instead of TCP
    #[arg(short, long)]
    pub socket: Option<PathBuf>,
    // Base URL of the n8n REST API, including the /api/v1 prefix
    #[arg(long, env = "N8N_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub n8n_api_base_url: String,
    // API key sent to n8n in the X-N8N-API-KEY header (required)
    #[arg(long, env = "N8N_API_KEY", hide_env_values = true)]
    pub n8n_api_key: String,
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    // Directory for rolling log files; enables file logging
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerArgs {
    pub fn upstream_config(&self) -> Result<UpstreamConfig, ConfigError> {
        UpstreamConfig::new(&self.n8n_api_base_url, &self.n8n_api_key)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn log_mode(&self) -> LogMode {
        match (&self.log_dir, self.log_format) {
            (Some(log_dir), _) => LogMode::ServerFile {
                log_dir: log_dir.clone(),
            },
            (None, LogFormat::Text) => LogMode::ServerDeployed,
            (None, LogFormat::Json) => LogMode::ServerJson,
        }
    }
}

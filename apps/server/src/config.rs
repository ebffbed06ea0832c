/// Server configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
    /// Path to the layered index definition (layers, tickers, scheduler).
    pub config_path: String,
    /// Directory where the JSON series files live.
    pub data_dir: String,
    /// Comma-separated list of allowed CORS origins, or `*` for any.
    pub cors_allow_origins: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Config {
            listen_addr: env_or("SIDX_LISTEN_ADDR", "0.0.0.0:8080"),
            config_path: env_or("SIDX_CONFIG_PATH", "./config.json"),
            data_dir: env_or("SIDX_DATA_DIR", "."),
            cors_allow_origins: env_or("SIDX_CORS_ALLOW_ORIGINS", "*"),
            request_timeout_ms: env_or("SIDX_REQUEST_TIMEOUT_MS", "30000")
                .parse()
                .unwrap_or(30_000),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

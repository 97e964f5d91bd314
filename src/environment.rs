use std::env;
use tracing::warn;

/// Connection settings for the external text-analytics provider, read from
/// the environment at startup.
///
/// Missing values are not fatal: the server still starts, and requests fail
/// at the provider boundary until the variables are configured.
pub struct ProviderSettings {
    pub endpoint: String,
    pub api_key: String,
}

pub fn provider_settings() -> ProviderSettings {
    let endpoint = match env::var("API_ENDPOINT") {
        Ok(val) => val,
        Err(_) => {
            warn!("API_ENDPOINT environment variable not set. Analysis requests will fail until it is configured.");
            String::new()
        }
    };
    let api_key = match env::var("API_KEY") {
        Ok(val) => val,
        Err(_) => {
            warn!("API_KEY environment variable not set. Analysis requests will fail until it is configured.");
            String::new()
        }
    };
    ProviderSettings { endpoint, api_key }
}

/// Port the HTTP server listens on, from `PORT` (default 3000).
pub fn listen_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000)
}

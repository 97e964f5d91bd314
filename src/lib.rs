pub mod analysis;
pub mod api;
pub mod environment;
pub mod input;
pub mod logging;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_PROVIDER_REQUEST: &str = "provider_request";

pub mod picker;
pub mod search;

use std::time::Duration;

use p4_config::Config;
use p4_sources::HttpOptions;

/// HTTP options from the `[http]` section
pub fn http_options(config: &Config) -> HttpOptions {
    HttpOptions {
        timeout: Duration::from_secs(config.http.timeout_secs),
        user_agent: config.http.user_agent.clone(),
    }
}

pub mod wiremock_helpers;

use policyfinder::config::HttpConfig;
use policyfinder::fetch::PolicyFetcher;

/// Fetcher with short timeouts suitable for mock-server tests.
pub fn test_fetcher() -> PolicyFetcher {
    test_fetcher_with_timeout(5)
}

pub fn test_fetcher_with_timeout(timeout_secs: u64) -> PolicyFetcher {
    let config = HttpConfig {
        user_agent: "policyfinder-tests/1.0".to_string(),
        request_timeout_secs: timeout_secs,
        max_redirects: 5,
        max_body_bytes: 1024 * 1024,
    };
    PolicyFetcher::new(&config).expect("test fetcher should build")
}

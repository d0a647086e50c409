use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a mock HTTP server that serves HTML content at the specified path.
pub async fn mock_html_page(url_path: &str, html: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_html_page(&server, url_path, html).await;
    server
}

/// Mounts an additional HTML page on an existing mock server.
pub async fn mount_html_page(server: &MockServer, url_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Creates a mock HTTP server that returns the specified HTTP error status
/// code for every request.
pub async fn mock_error_server(status_code: u16) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(&server)
        .await;

    server
}

/// Creates a mock HTTP server that delays responses past the client timeout.
pub async fn mock_timeout_server(delay_ms: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("delayed response")
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(&server)
        .await;

    server
}

/// A landing page with one privacy anchor pointing at `policy_path`.
pub fn landing_page_html(policy_path: &str) -> String {
    format!(
        r#"<html><body>
        <nav><a href="/about">About</a><a href="{}">Privacy Policy</a></nav>
        <p>Welcome to our site.</p>
        </body></html>"#,
        policy_path
    )
}

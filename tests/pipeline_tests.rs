//! End-to-end pipeline tests against wiremock servers.

mod common;

use std::sync::atomic::AtomicBool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::wiremock_helpers::{
    landing_page_html, mock_error_server, mock_html_page, mock_timeout_server, mount_html_page,
};
use common::{test_fetcher, test_fetcher_with_timeout};

use policyfinder::batch::{run_batch, BatchOptions};
use policyfinder::fetch::FetchErrorKind;
use policyfinder::processor::{process_site, SiteStatus};
use policyfinder::rate_limit::SharedRateLimiter;
use policyfinder::sitelist::SiteRecord;

fn site(name: &str, url: String) -> SiteRecord {
    SiteRecord {
        name: name.to_string(),
        url,
    }
}

#[tokio::test]
async fn test_full_pipeline_success() {
    let server = mock_html_page("/", &landing_page_html("/privacy")).await;
    mount_html_page(
        &server,
        "/privacy",
        "<html><body><h1>Privacy Policy</h1><p>We collect X.</p></body></html>",
    )
    .await;

    let fetcher = test_fetcher();
    let record = process_site(&fetcher, &site("Acme", server.uri()), false).await;

    assert_eq!(record.status, SiteStatus::Ok);
    assert_eq!(record.company_name, "Acme");
    assert_eq!(
        record.policy_url.as_deref(),
        Some(format!("{}/privacy", server.uri()).as_str())
    );
    assert_eq!(record.extracted_text.as_deref(), Some("Privacy Policy We collect X."));
}

#[tokio::test]
async fn test_no_privacy_anchor_yields_no_link_found() {
    let html = r#"<html><body><a href="/about">About us</a><a href="/terms">Terms</a></body></html>"#;
    let server = mock_html_page("/", html).await;

    let fetcher = test_fetcher();
    let record = process_site(&fetcher, &site("Plain", server.uri()), false).await;

    assert_eq!(record.status, SiteStatus::NoLinkFound);
    assert!(record.policy_url.is_none());
    assert!(record.extracted_text.is_none());
}

#[tokio::test]
async fn test_href_keyword_matches_without_anchor_text() {
    let html = r#"<html><body><a href="/privacy-notice"><img src="x.png"></a></body></html>"#;
    let server = mock_html_page("/", html).await;
    mount_html_page(&server, "/privacy-notice", "<p>Notice text.</p>").await;

    let fetcher = test_fetcher();
    let record = process_site(&fetcher, &site("Imgs", server.uri()), false).await;

    assert_eq!(record.status, SiteStatus::Ok);
    assert_eq!(record.extracted_text.as_deref(), Some("Notice text."));
}

#[tokio::test]
async fn test_policy_fetch_failure_preserves_url() {
    let server = mock_html_page("/", &landing_page_html("/privacy")).await;
    Mock::given(method("GET"))
        .and(path("/privacy"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let record = process_site(&fetcher, &site("Gone", server.uri()), false).await;

    assert_eq!(record.status, SiteStatus::FetchFailed);
    assert_eq!(
        record.policy_url.as_deref(),
        Some(format!("{}/privacy", server.uri()).as_str())
    );
    assert!(record.extracted_text.is_none());
}

#[tokio::test]
async fn test_base_error_status_yields_unreachable() {
    let server = mock_error_server(503).await;

    let fetcher = test_fetcher();
    let record = process_site(&fetcher, &site("Down", server.uri()), false).await;

    assert_eq!(record.status, SiteStatus::Unreachable);
    assert!(record.policy_url.is_none());
}

#[tokio::test]
async fn test_base_timeout_yields_unreachable() {
    let server = mock_timeout_server(3_000).await;

    let fetcher = test_fetcher_with_timeout(1);
    let record = process_site(&fetcher, &site("Slow", server.uri()), false).await;

    assert_eq!(record.status, SiteStatus::Unreachable);
}

#[tokio::test]
async fn test_non_html_content_type_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"privacy": true}"#)
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let url = url::Url::parse(&server.uri()).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchErrorKind::InvalidContentType(_)));

    // Through the pipeline it counts as an unreachable base page.
    let record = process_site(&fetcher, &site("Api", server.uri()), false).await;
    assert_eq!(record.status, SiteStatus::Unreachable);
}

#[tokio::test]
async fn test_first_anchor_in_document_order_wins() {
    let html = r#"<html><body>
        <a href="/privacy-first">Privacy</a>
        <a href="/privacy-second">Privacy Policy</a>
        </body></html>"#;
    let server = mock_html_page("/", html).await;
    mount_html_page(&server, "/privacy-first", "<p>First.</p>").await;
    mount_html_page(&server, "/privacy-second", "<p>Second.</p>").await;

    let fetcher = test_fetcher();
    let record = process_site(&fetcher, &site("Order", server.uri()), false).await;

    assert_eq!(record.status, SiteStatus::Ok);
    assert_eq!(record.extracted_text.as_deref(), Some("First."));
}

#[tokio::test]
async fn test_batch_emits_one_record_per_site_in_input_order() {
    // Mixed outcomes across several servers, run with enough parallelism
    // that completion order differs from input order.
    let ok_server = mock_html_page("/", &landing_page_html("/privacy")).await;
    mount_html_page(&ok_server, "/privacy", "<p>Policy A.</p>").await;

    let slow_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(landing_page_html("/privacy"), "text/html")
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&slow_server)
        .await;
    mount_html_page(&slow_server, "/privacy", "<p>Policy B.</p>").await;

    let error_server = mock_error_server(500).await;
    let no_link_server = mock_html_page("/", "<html><body><p>nothing</p></body></html>").await;

    let sites = vec![
        site("Slow", slow_server.uri()),
        site("Fast", ok_server.uri()),
        site("Down", error_server.uri()),
        site("Bare", no_link_server.uri()),
    ];

    let fetcher = test_fetcher();
    let limiter = SharedRateLimiter::new(0);
    let cancel = AtomicBool::new(false);
    let options = BatchOptions {
        parallel_jobs: 4,
        probe_common_paths: false,
        show_progress: false,
    };

    let (records, summary) = run_batch(&fetcher, &sites, &options, &limiter, &cancel).await;

    assert_eq!(records.len(), 4);
    let names: Vec<&str> = records.iter().map(|r| r.company_name.as_str()).collect();
    assert_eq!(names, vec!["Slow", "Fast", "Down", "Bare"]);

    assert_eq!(records[0].status, SiteStatus::Ok);
    assert_eq!(records[0].extracted_text.as_deref(), Some("Policy B."));
    assert_eq!(records[1].status, SiteStatus::Ok);
    assert_eq!(records[2].status, SiteStatus::Unreachable);
    assert_eq!(records[3].status, SiteStatus::NoLinkFound);

    assert_eq!(summary.ok, 2);
    assert_eq!(summary.unreachable, 1);
    assert_eq!(summary.no_link_found, 1);
    assert_eq!(summary.cancelled, 0);
}

#[tokio::test]
async fn test_redirected_base_page_resolves_links_against_final_url() {
    let target = mock_html_page("/landing/", &landing_page_html("privacy.html")).await;
    mount_html_page(&target, "/landing/privacy.html", "<p>Redirected policy.</p>").await;

    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/landing/", target.uri()).as_str()),
        )
        .mount(&origin)
        .await;

    let fetcher = test_fetcher();
    let record = process_site(&fetcher, &site("Moved", origin.uri()), false).await;

    assert_eq!(record.status, SiteStatus::Ok);
    assert_eq!(
        record.policy_url.as_deref(),
        Some(format!("{}/landing/privacy.html", target.uri()).as_str())
    );
    assert_eq!(record.extracted_text.as_deref(), Some("Redirected policy."));
}

#[tokio::test]
async fn test_common_path_probe_fallback() {
    let server = mock_html_page("/", "<html><body><p>no links here</p></body></html>").await;
    mount_html_page(&server, "/privacy-policy", "<p>Probed policy.</p>").await;
    Mock::given(method("HEAD"))
        .and(path("/privacy-policy"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();

    // Disabled: no fallback, discovery alone decides.
    let record = process_site(&fetcher, &site("Hidden", server.uri()), false).await;
    assert_eq!(record.status, SiteStatus::NoLinkFound);

    // Enabled: the HEAD probe finds the well-known path.
    let record = process_site(&fetcher, &site("Hidden", server.uri()), true).await;
    assert_eq!(record.status, SiteStatus::Ok);
    assert_eq!(record.extracted_text.as_deref(), Some("Probed policy."));
}

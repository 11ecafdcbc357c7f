//! End-to-end tests for the search pipeline against a mock Commons API
//!
//! These exercise the real reqwest transport, the resolver and the
//! downloader together. No network access outside localhost is needed.

use std::sync::Arc;
use std::time::Duration;

use commons_images_mcp::request::parse_endpoint;
use commons_images_mcp::{
    Downloader, FailurePolicy, Identification, ImageSearch, ImagesError, ReqwestTransport,
    UrlField,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_against(server: &MockServer) -> ImageSearch {
    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let endpoint = parse_endpoint(&format!("{}/w/api.php", server.uri())).unwrap();
    ImageSearch::new(
        Arc::new(transport),
        Identification::new("BearImageBot", "1.0", "bears@example.org"),
        endpoint,
    )
}

fn search_body(base: &str) -> String {
    format!(
        r#"{{
            "batchcomplete": "",
            "query": {{
                "pages": {{
                    "501": {{
                        "pageid": 501,
                        "ns": 6,
                        "title": "File:Grizzly_bear.jpg",
                        "imageinfo": [{{
                            "url": "{base}/full/Grizzly_bear.jpg",
                            "thumburl": "{base}/thumb/800px-Grizzly_bear.jpg",
                            "width": 4000,
                            "height": 3000,
                            "mime": "image/jpeg"
                        }}]
                    }},
                    "77": {{
                        "pageid": 77,
                        "ns": 6,
                        "title": "File:Bear_report.pdf",
                        "imageinfo": [{{
                            "url": "{base}/full/Bear_report.pdf",
                            "mime": "application/pdf"
                        }}]
                    }},
                    "12": {{
                        "pageid": 12,
                        "ns": 6,
                        "title": "File:Cub.png",
                        "imageinfo": [{{
                            "url": "{base}/full/Cub.png",
                            "mime": "image/png"
                        }}]
                    }}
                }}
            }}
        }}"#
    )
}

#[tokio::test]
async fn search_resolves_images_in_document_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("gsrsearch", "filetype:bitmap grizzly bear"))
        .and(query_param("gsrlimit", "3"))
        .and(header(
            "user-agent",
            "BearImageBot/1.0 (bears@example.org) reqwest/0.12",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_body(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = search_against(&server).search_images("grizzly bear", 3).await;

    assert!(outcome.diagnostic.is_none());
    let titles: Vec<&str> = outcome.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Grizzly_bear.jpg", "Cub.png"]);
    assert_eq!(outcome.results[1].thumb_url, "");
}

#[tokio::test]
async fn server_error_degrades_to_empty_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let search = search_against(&server);

    let outcome = search.search_images("bear", 10).await;
    assert!(outcome.results.is_empty());
    assert!(outcome.diagnostic.unwrap().contains("500"));

    let err = search
        .with_policy(FailurePolicy::Propagate)
        .run("bear", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, ImagesError::Transport(_)));
}

#[tokio::test]
async fn zero_matches_is_reported_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"batchcomplete":""}"#))
        .mount(&server)
        .await;

    let outcome = search_against(&server)
        .with_policy(FailurePolicy::Propagate)
        .run("xyzzy", 10)
        .await
        .unwrap();

    assert!(outcome.results.is_empty());
    assert_eq!(outcome.diagnostic.as_deref(), Some("No images found"));
}

#[tokio::test]
async fn search_then_download_full_resolution() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_body(&base)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/full/Grizzly_bear.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"grizzly".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/full/Cub.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"cub".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = search_against(&server).search_images("bear", 10).await;

    let dir = tempfile::tempdir().unwrap();
    let downloader = Downloader::new(
        &Default::default(),
        &Identification::new("BearImageBot", "1.0", "bears@example.org"),
    )
    .unwrap();
    let report = downloader
        .download(&outcome.results, UrlField::Full, dir.path())
        .await
        .unwrap();

    assert_eq!(report.saved, 2);
    assert_eq!(report.failed, 0);

    let first = report.items[0].path.as_ref().unwrap();
    let second = report.items[1].path.as_ref().unwrap();
    assert_eq!(first.extension().unwrap(), "jpg");
    assert_eq!(second.extension().unwrap(), "png");
    assert_eq!(std::fs::read(first).unwrap(), b"grizzly");
    assert_eq!(std::fs::read(second).unwrap(), b"cub");
}

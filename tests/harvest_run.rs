mod helpers;

use std::sync::Arc;

use gleaner::fetcher::HttpFetcher;
use gleaner::harvest::{Harvester, KeywordState};
use gleaner::policy::Policy;
use helpers::{png, test_config};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

async fn mount_image(server: &MockServer, image_path: &str, body: Vec<u8>, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("Content-Type", "image/png"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_aspect_mode() {
    let server = MockServer::start().await;
    let base = server.uri();

    let search_html = format!(
        r#"<html><head><link href="https://www.gstatic.com/logo.png"></head><body>
<script>var d = ["{base}/img/wide.png", "{base}/img/portrait.png", "{base}/img/broken.png",
"{base}/img/missing.png", "{base}/img/tall.png", "{base}/img/second.png", "{base}/img/unused.png"];</script>
</body></html>"#
    );
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "cat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(search_html)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_image(&server, "/img/wide.png", png(800, 600), 1).await;
    mount_image(&server, "/img/portrait.png", png(600, 720), 1).await;
    mount_image(&server, "/img/broken.png", b"\x89PNG\r\n\x1a\nnot really".to_vec(), 1).await;
    Mock::given(method("GET"))
        .and(path("/img/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_image(&server, "/img/tall.png", png(500, 1000), 1).await;
    mount_image(&server, "/img/second.png", png(520, 520), 1).await;
    // Quota is met before this one
    mount_image(&server, "/img/unused.png", png(600, 720), 0).await;

    let out = TempDir::new().unwrap();
    let config = test_config(&base, &["cat"])
        .with_quota(2)
        .with_output_dir(out.path());
    let fetcher = HttpFetcher::new(&config).unwrap();
    let policy = Policy::from_config(&config).unwrap();
    let harvester = Harvester::new(config, Arc::new(fetcher), policy);

    let report = harvester.run().await;

    assert_eq!(report.keywords.len(), 1);
    let keyword = &report.keywords[0];
    assert_eq!(keyword.state, KeywordState::Done);
    assert_eq!(keyword.candidates_found, 7);
    assert_eq!(keyword.attempted, 6);
    assert_eq!(keyword.accepted, 2);
    assert_eq!(keyword.skipped.rejected, 2);
    assert_eq!(keyword.skipped.decode, 1);
    assert_eq!(keyword.skipped.fetch, 1);

    let first = image::open(out.path().join("cat/cat_1.jpg")).unwrap();
    assert_eq!((first.width(), first.height()), (600, 720));
    assert_eq!(first.color(), image::ColorType::L8);
    let second = image::open(out.path().join("cat/cat_2.jpg")).unwrap();
    assert_eq!((second.width(), second.height()), (520, 520));
    assert!(!out.path().join("cat/cat_3.jpg").exists());
}

#[tokio::test]
async fn test_failed_search_moves_to_next_keyword() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "dog"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "cat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<img src=\"{base}/img/cat.png\">"
        )))
        .expect(1)
        .mount(&server)
        .await;
    mount_image(&server, "/img/cat.png", png(600, 700), 1).await;

    let out = TempDir::new().unwrap();
    let config = test_config(&base, &["dog", "cat"])
        .with_quota(3)
        .with_output_dir(out.path());
    let fetcher = HttpFetcher::new(&config).unwrap();
    let policy = Policy::from_config(&config).unwrap();
    let report = Harvester::new(config, Arc::new(fetcher), policy)
        .run()
        .await;

    assert!(report.keywords[0].search_failed);
    assert_eq!(report.keywords[0].accepted, 0);
    // The directory is prepared before the search runs
    assert!(out.path().join("dog").is_dir());

    assert!(!report.keywords[1].search_failed);
    assert_eq!(report.keywords[1].accepted, 1);
    assert!(out.path().join("cat/cat_1.jpg").is_file());
}
